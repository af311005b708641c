//! The [`RequestHandler`] that turns Host Store lookups into DNS answers.
//!
//! Only the first question of an incoming message is ever considered — the
//! request type `hickory_server` hands handlers already reflects that, since
//! [`Request::query`] exposes a single query.

use hickory_server::authority::MessageResponseBuilder;
use hickory_server::proto::op::{Header, ResponseCode};
use hickory_server::proto::rr::{Name, RData, Record, RecordType, rdata};
use hickory_server::server::{Request, RequestHandler, ResponseHandler, ResponseInfo};

use dockhound_core::HostStore;

/// Resolves A and PTR queries against a [`HostStore`]; everything else, and
/// anything unknown, is answered with NXDOMAIN.
pub struct Handler {
    store: HostStore,
}

impl Handler {
    /// Build a handler backed by the given Host Store.
    #[must_use]
    pub fn new(store: HostStore) -> Self {
        Self { store }
    }

    fn answers_for(&self, query_name: &Name, qtype: RecordType) -> Vec<Record> {
        match qtype {
            RecordType::A => self
                .store
                .find_forward(&query_name.to_utf8())
                .into_iter()
                .map(|addr| Record::from_rdata(query_name.clone(), 0, RData::A(rdata::A(addr))))
                .collect(),
            RecordType::PTR => self
                .store
                .find_reverse(&query_name.to_utf8())
                .into_iter()
                .filter_map(|name| Name::from_utf8(&name).ok())
                .map(|ptr| {
                    Record::from_rdata(query_name.clone(), 0, RData::PTR(rdata::PTR(ptr)))
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

#[async_trait::async_trait]
impl RequestHandler for Handler {
    async fn handle_request<R: ResponseHandler>(
        &self,
        request: &Request,
        mut response_handle: R,
    ) -> ResponseInfo {
        let query = request.query();
        let query_name: Name = query.original().name().clone();
        let qtype = query.query_type();

        let answers = self.answers_for(&query_name, qtype);

        let mut header = Header::response_from_request(request.header());
        header.set_response_code(if answers.is_empty() {
            ResponseCode::NXDomain
        } else {
            ResponseCode::NoError
        });

        let builder = MessageResponseBuilder::from_message_request(request);
        let response = builder.build(header, answers.iter(), &[], &[], &[]);

        match response_handle.send_response(response).await {
            Ok(info) => info,
            Err(error) => {
                tracing::warn!(%error, "failed to send DNS response");
                let mut header = Header::new();
                header.set_response_code(ResponseCode::ServFail);
                header.into()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dockhound_core::Host;
    use std::net::Ipv4Addr;

    async fn store_with_redis() -> HostStore {
        let store = HostStore::spawn();
        let mut sub = store.subscribe().await.unwrap();
        store
            .add_host(Host {
                id: "h1".to_owned(),
                address: Ipv4Addr::new(10, 0, 0, 5),
                name: "redis.docker".to_owned(),
                aliases: Vec::new(),
            })
            .await
            .unwrap();
        sub.on_add.recv().await.unwrap();
        store
    }

    #[tokio::test]
    async fn forward_hit_returns_address() {
        let store = store_with_redis().await;
        let handler = Handler::new(store);
        let name = Name::from_utf8("redis.docker.").unwrap();
        let records = handler.answers_for(&name, RecordType::A);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].data(), Some(&RData::A(rdata::A(Ipv4Addr::new(10, 0, 0, 5)))));
    }

    #[tokio::test]
    async fn reverse_hit_returns_name() {
        let store = store_with_redis().await;
        let handler = Handler::new(store);
        let name = Name::from_utf8("5.0.0.10.in-addr.arpa.").unwrap();
        let records = handler.answers_for(&name, RecordType::PTR);
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn unknown_name_has_no_answers() {
        let store = store_with_redis().await;
        let handler = Handler::new(store);
        let name = Name::from_utf8("missing.docker.").unwrap();
        assert!(handler.answers_for(&name, RecordType::A).is_empty());
    }

    #[tokio::test]
    async fn other_qtype_has_no_answers() {
        let store = store_with_redis().await;
        let handler = Handler::new(store);
        let name = Name::from_utf8("redis.docker.").unwrap();
        assert!(handler.answers_for(&name, RecordType::AAAA).is_empty());
    }
}
