pub mod common;

use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio::sync::oneshot;
use tonic::transport::Channel;
use user_directory::{
    proto::{self, UsersClient},
    server,
};

async fn connect(addr: std::net::SocketAddr) -> UsersClient<Channel> {
    for _ in 0..50 {
        if let Ok(client) = UsersClient::connect(format!("http://{addr}")).await {
            return client;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("server at {addr} never came up");
}

#[tokio::test]
async fn serves_until_shutdown() {
    let db = common::setup().await;
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let (stop, stopped) = oneshot::channel::<()>();

    let handle = tokio::spawn(server::serve(db, addr, Duration::from_secs(5), async {
        stopped.await.ok();
    }));

    let mut client = connect(addr).await;
    let created = client
        .create_user(proto::CreateUserRequest {
            name: "A".to_owned(),
            password_hash: "h".to_owned(),
            username: "a".to_owned(),
            email: "a@x".to_owned(),
        })
        .await
        .unwrap()
        .into_inner()
        .user
        .unwrap();

    let status = client
        .user_by_id(proto::UserByIdRequest { id: created.id + 1 })
        .await
        .unwrap_err();
    assert_eq!(status.code(), tonic::Code::NotFound);

    drop(client);
    stop.send(()).unwrap();
    handle.await.unwrap().unwrap();
}
