//! Integration tests for the WebSocket transport.
//!
//! These tests spin up a real WebSocket listener and client to verify
//! that frames keep their representation across the socket and that the
//! dialing side works against our own listener.

#[cfg(feature = "websocket")]
mod websocket {
    use futures_util::{SinkExt, StreamExt};
    use tapline_transport::{
        Connection, Frame, Transport, TransportError, WebSocketConnection,
        WebSocketTransport,
    };
    use tokio_tungstenite::tungstenite::Message;

    async fn bind() -> (WebSocketTransport, String) {
        let transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("local addr").to_string();
        (transport, addr)
    }

    async fn connect_client(
        addr: &str,
    ) -> tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    > {
        let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
            .await
            .expect("client should connect");
        ws
    }

    #[tokio::test]
    async fn test_websocket_accept_and_send_receive() {
        let (mut transport, addr) = bind().await;
        let server_handle = tokio::spawn(async move {
            transport.accept().await.expect("should accept")
        });

        let mut client_ws = connect_client(&addr).await;
        let server_conn = server_handle.await.expect("task should complete");
        assert!(server_conn.id().into_inner() > 0);

        // --- Server sends text, client receives a text message ---
        server_conn
            .send(Frame::Text("]B100 Foo\n".into()))
            .await
            .expect("send should succeed");
        let msg = client_ws.next().await.unwrap().unwrap();
        assert!(msg.is_text());
        assert_eq!(msg.into_text().unwrap().as_str(), "]B100 Foo\n");

        // --- Client sends binary, server receives a binary frame ---
        client_ws
            .send(Message::Binary(vec![b'@', 0xfe, b'\n'].into()))
            .await
            .unwrap();
        let received = server_conn
            .recv()
            .await
            .expect("recv should succeed")
            .expect("should have data");
        assert_eq!(received, Frame::Binary(vec![b'@', 0xfe, b'\n']));

        server_conn.close().await.expect("close should succeed");
    }

    #[tokio::test]
    async fn test_websocket_recv_returns_none_on_client_close() {
        let (mut transport, addr) = bind().await;
        let server_handle = tokio::spawn(async move {
            transport.accept().await.expect("should accept")
        });

        let mut client_ws = connect_client(&addr).await;
        let server_conn = server_handle.await.unwrap();

        client_ws.send(Message::Close(None)).await.unwrap();

        let result = server_conn.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on client close");
    }

    #[tokio::test]
    async fn test_dialed_connection_talks_to_listener() {
        let (mut transport, addr) = bind().await;
        let server_handle = tokio::spawn(async move {
            transport.accept().await.expect("should accept")
        });

        let dialed = WebSocketConnection::connect(&format!("ws://{addr}"))
            .await
            .expect("should dial");
        let accepted = server_handle.await.unwrap();
        assert_ne!(dialed.id(), accepted.id());

        dialed.send(Frame::Text("m 1\n".into())).await.unwrap();
        let got = accepted.recv().await.unwrap().unwrap();
        assert_eq!(got, Frame::Text("m 1\n".into()));
    }

    #[tokio::test]
    async fn test_send_while_recv_pending() {
        let (mut transport, addr) = bind().await;
        let server_handle = tokio::spawn(async move {
            transport.accept().await.expect("should accept")
        });

        let mut client_ws = connect_client(&addr).await;
        let server_conn =
            std::sync::Arc::new(server_handle.await.expect("accepted"));

        // Park a receive on the server side; the send below must not wait
        // for it to complete.
        let receiver = std::sync::Arc::clone(&server_conn);
        let pending = tokio::spawn(async move { receiver.recv().await });
        tokio::task::yield_now().await;

        tokio::time::timeout(
            std::time::Duration::from_secs(2),
            server_conn.send(Frame::Text("ping\n".into())),
        )
        .await
        .expect("send must not block on pending recv")
        .unwrap();
        let msg = client_ws.next().await.unwrap().unwrap();
        assert_eq!(msg.into_text().unwrap().as_str(), "ping\n");

        client_ws.send(Message::Text("pong\n".into())).await.unwrap();
        let got = pending.await.unwrap().unwrap().unwrap();
        assert_eq!(got, Frame::Text("pong\n".into()));
    }

    #[tokio::test]
    async fn test_connect_to_closed_port_fails() {
        let (transport, addr) = bind().await;
        drop(transport);

        let url = format!("ws://{addr}");
        match WebSocketConnection::connect(&url).await {
            Err(TransportError::Upstream { url: failed, .. }) => assert_eq!(failed, url),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("connect should fail"),
        }
    }
}
