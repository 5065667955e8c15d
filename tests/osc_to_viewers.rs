//! End-to-end: real OSC datagrams over loopback UDP into viewer queues

use rosc::{encoder, OscMessage, OscPacket, OscType};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, oneshot};

use osc_timecode_relay::{
    fanout::Frame, network::OscListener, transport::CommandRouter, Relay, TransportState,
};

fn datagram(addr: &str, args: Vec<OscType>) -> Vec<u8> {
    encoder::encode(&OscPacket::Message(OscMessage {
        addr: addr.to_string(),
        args,
    }))
    .unwrap()
}

async fn next_frame(rx: &mut mpsc::Receiver<Frame>) -> String {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("frame within timeout")
        .expect("queue open")
        .to_string()
}

struct Harness {
    relay: Arc<Relay>,
    sender: UdpSocket,
    stop: Option<oneshot::Sender<()>>,
    task: tokio::task::JoinHandle<osc_timecode_relay::Result<()>>,
}

impl Harness {
    async fn start(reset_on_stop: bool) -> Self {
        let relay = Arc::new(Relay::new(CommandRouter::new(reset_on_stop), 16));
        let listener = OscListener::bind_addr("127.0.0.1:0".parse().unwrap(), 0).unwrap();
        let target = listener.local_addr();

        let (stop, stopped) = oneshot::channel::<()>();
        let task = tokio::spawn(listener.run(relay.clone(), async move {
            let _ = stopped.await;
        }));

        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        sender.connect(target).await.unwrap();

        Self { relay, sender, stop: Some(stop), task }
    }

    async fn send(&self, addr: &str, args: Vec<OscType>) {
        self.sender.send(&datagram(addr, args)).await.unwrap();
    }

    async fn shutdown(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        self.task.await.unwrap().unwrap();
    }
}

#[tokio::test]
async fn test_snapshot_then_live_updates() {
    let harness = Harness::start(false).await;
    let mut viewer = harness.relay.connect_viewer("127.0.0.1");

    assert_eq!(next_frame(&mut viewer.rx).await, r#"{"type":"state","value":"stop"}"#);
    assert_eq!(next_frame(&mut viewer.rx).await, r#"{"type":"time","value":"00:00:00"}"#);

    harness.send("/time", vec![OscType::String("01:02:03".into())]).await;
    assert_eq!(next_frame(&mut viewer.rx).await, r#"{"type":"time","value":"01:02:03"}"#);

    harness.send("/play", vec![OscType::Int(1)]).await;
    assert_eq!(next_frame(&mut viewer.rx).await, r#"{"type":"state","value":"play"}"#);

    harness.shutdown().await;
}

#[tokio::test]
async fn test_noise_is_ignored() {
    let harness = Harness::start(false).await;
    let mut viewer = harness.relay.connect_viewer("127.0.0.1");
    next_frame(&mut viewer.rx).await;
    next_frame(&mut viewer.rx).await;

    harness.send("/foo", vec![OscType::Int(1)]).await;
    harness.send("/time", vec![OscType::String("abc".into())]).await;
    harness.send("/play", vec![OscType::Int(0)]).await;
    harness.sender.send(b"garbage").await.unwrap();
    // marker: datagrams are processed in order, so anything before it was dropped
    harness.send("/Transport/Time", vec![OscType::Double(3725.4)]).await;

    assert_eq!(next_frame(&mut viewer.rx).await, r#"{"type":"time","value":"01:02:05"}"#);
    assert_eq!(harness.relay.snapshot().transport, TransportState::Stopped);

    harness.shutdown().await;
}

#[tokio::test]
async fn test_stop_with_reset_over_udp() {
    let harness = Harness::start(true).await;

    harness
        .send(
            "/time",
            vec![OscType::Int(0), OscType::Int(10), OscType::Float(0.0)],
        )
        .await;
    harness.send("/play", vec![]).await;

    let mut viewer = harness.relay.connect_viewer("127.0.0.1");
    // snapshot may be taken before or after the datagrams land; wait for both
    loop {
        let show = harness.relay.snapshot();
        if show.transport == TransportState::Playing && show.timecode.total_seconds() == 600 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    while viewer.rx.try_recv().is_ok() {}

    harness.send("/stop", vec![]).await;
    assert_eq!(next_frame(&mut viewer.rx).await, r#"{"type":"time","value":"00:00:00"}"#);
    assert_eq!(next_frame(&mut viewer.rx).await, r#"{"type":"state","value":"stop"}"#);

    harness.shutdown().await;
}
