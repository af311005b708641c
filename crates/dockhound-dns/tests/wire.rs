//! End-to-end wire round trip: a real UDP client talking to a real
//! [`DnsEngine`] backed by a live [`HostStore`].

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use hickory_server::proto::op::{Message, MessageType, OpCode, Query};
use hickory_server::proto::rr::{Name, RData, RecordType, rdata};
use hickory_server::proto::serialize::binary::{BinDecodable, BinEncodable};

use dockhound_core::{Host, HostStore};
use dockhound_dns::DnsEngine;

async fn ask(bind_addr: SocketAddr, name: &str, qtype: RecordType) -> Message {
    let mut query = Message::new();
    query.set_id(1);
    query.set_message_type(MessageType::Query);
    query.set_op_code(OpCode::Query);
    query.set_recursion_desired(true);
    query.add_query(Query::query(Name::from_utf8(name).unwrap(), qtype));

    let socket = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
    socket.send_to(&query.to_bytes().unwrap(), bind_addr).await.unwrap();

    let mut buf = [0u8; 512];
    let (len, _) =
        tokio::time::timeout(Duration::from_secs(2), socket.recv_from(&mut buf)).await.unwrap().unwrap();

    Message::from_bytes(&buf[..len]).unwrap()
}

#[tokio::test]
async fn resolves_a_record_over_udp() {
    let store = HostStore::spawn();
    let mut sub = store.subscribe().await.unwrap();
    store
        .add_host(Host {
            id: "h1".to_owned(),
            address: Ipv4Addr::new(10, 1, 2, 3),
            name: "redis.docker".to_owned(),
            aliases: Vec::new(),
        })
        .await
        .unwrap();
    sub.on_add.recv().await.unwrap();

    let bind_addr: SocketAddr = "127.0.0.1:15353".parse().unwrap();
    let engine = DnsEngine::start(bind_addr, store).await.unwrap();

    let response = ask(bind_addr, "redis.docker.", RecordType::A).await;
    assert_eq!(response.answers().len(), 1);
    match response.answers()[0].data() {
        Some(RData::A(rdata::A(addr))) => assert_eq!(*addr, Ipv4Addr::new(10, 1, 2, 3)),
        other => panic!("expected an A record, got {other:?}"),
    }

    engine.shutdown().await;
}

#[tokio::test]
async fn unknown_name_is_nxdomain() {
    let store = HostStore::spawn();
    let bind_addr: SocketAddr = "127.0.0.1:15354".parse().unwrap();
    let engine = DnsEngine::start(bind_addr, store).await.unwrap();

    let response = ask(bind_addr, "nothing-here.docker.", RecordType::A).await;
    assert!(response.answers().is_empty());
    assert_eq!(response.response_code(), hickory_server::proto::op::ResponseCode::NXDomain);

    engine.shutdown().await;
}
