//! End-to-end scenarios against a real listener on an ephemeral port.
use std::{net::SocketAddr, time::Duration};

use anyhow::{anyhow, Context, Result};
use futures::{SinkExt, StreamExt};
use linechat_protocol::{Message, MessageCodec};
use linechat_server::Server;
use tokio::{
    io::AsyncWriteExt,
    net::{TcpListener, TcpStream},
    time::timeout,
};
use tokio_util::codec::Framed;

const RECV_TIMEOUT: Duration = Duration::from_secs(3);

type Client = Framed<TcpStream, MessageCodec>;

async fn start_server() -> Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let server = Server::new(listener);
    let addr = server.local_addr()?;
    tokio::spawn(server.run());
    Ok(addr)
}

async fn connect(addr: SocketAddr) -> Result<Client> {
    let stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("failed to connect to {addr}"))?;
    Ok(Framed::new(stream, MessageCodec::default()))
}

async fn recv(client: &mut Client, waiting_for: &str) -> Result<Message> {
    match timeout(RECV_TIMEOUT, client.next()).await {
        Ok(Some(Ok(message))) => Ok(message),
        Ok(Some(Err(err))) => Err(err).context(format!("{waiting_for}: read failed")),
        Ok(None) => Err(anyhow!("{waiting_for}: connection closed")),
        Err(_) => Err(anyhow!("{waiting_for}: timed out")),
    }
}

#[tokio::test]
async fn join_sequence_announces_to_earlier_connections() -> Result<()> {
    let addr = start_server().await?;

    let mut a = connect(addr).await?;
    assert_eq!(recv(&mut a, "a's joined frame").await?, Message::joined(1));

    let mut b = connect(addr).await?;
    assert_eq!(recv(&mut b, "b's joined frame").await?, Message::joined(2));
    assert_eq!(
        recv(&mut a, "join notice at a").await?,
        Message::info("User 2 joined the chat")
    );

    Ok(())
}

#[tokio::test]
async fn chat_is_relayed_to_everyone_including_the_sender() -> Result<()> {
    let addr = start_server().await?;

    let mut a = connect(addr).await?;
    recv(&mut a, "a's joined frame").await?;
    let mut b = connect(addr).await?;
    recv(&mut b, "b's joined frame").await?;
    recv(&mut a, "join notice at a").await?;

    a.send(Message::msg("hi")).await?;

    assert_eq!(
        recv(&mut a, "a's own message back").await?,
        Message::msg("user 1: hi")
    );
    assert_eq!(
        recv(&mut b, "a's message at b").await?,
        Message::msg("user 1: hi")
    );

    Ok(())
}

#[tokio::test]
async fn leave_notice_and_continued_delivery_to_the_rest() -> Result<()> {
    let addr = start_server().await?;

    let mut a = connect(addr).await?;
    recv(&mut a, "a's joined frame").await?;
    let b = connect(addr).await?;
    recv(&mut a, "join notice at a").await?;

    drop(b);
    assert_eq!(
        recv(&mut a, "leave notice at a").await?,
        Message::info("User 2 left the chat")
    );

    // Broadcast still works with only a registered
    a.send(Message::msg("anyone there?")).await?;
    assert_eq!(
        recv(&mut a, "a's message after b left").await?,
        Message::msg("user 1: anyone there?")
    );

    Ok(())
}

#[tokio::test]
async fn malformed_and_disallowed_frames_are_dropped_not_fatal() -> Result<()> {
    let addr = start_server().await?;

    // Raw socket so we can write bytes the codec would never emit
    let mut raw = TcpStream::connect(addr).await?;
    let mut b = connect(addr).await?;
    assert_eq!(recv(&mut b, "b's joined frame").await?, Message::joined(2));

    raw.write_all(
        b"{\"type\":\"msg\",\"msg\":\"before\"}\n\
          not json at all\n\
          {\"type\":\"info\",\"msg\":\"clients may not send this\"}\n\
          {\"type\":\"msg\",\"msg\":\"after\"}\n",
    )
    .await?;

    // Both valid chat frames arrive; the garbage and the disallowed
    // info frame are dropped without killing the connection
    assert_eq!(
        recv(&mut b, "first valid frame").await?,
        Message::msg("user 1: before")
    );
    assert_eq!(
        recv(&mut b, "second valid frame").await?,
        Message::msg("user 1: after")
    );

    Ok(())
}
