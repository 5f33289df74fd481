use actix_web::{HttpRequest, HttpResponse, Result, web};
use actix_ws::{CloseReason, Message, MessageStream, Session};
use futures_util::StreamExt;

use chat_services::{ChatError, ChatHub, Delivery, InboundFrame, OutboundFrame, ParticipantId};

/// Upgrades the connection to a websocket and joins the chat channel.
///
/// Each text frame `{"event":"message","senderName":…,"body":…}` is published to
/// every participant, the sender included. Rejected frames are answered with an
/// error frame to the sender only.
pub async fn chat_socket(
    req: HttpRequest,
    body: web::Payload,
    hub: web::Data<ChatHub>,
) -> Result<HttpResponse> {
    let (response, session, stream) = actix_ws::handle(&req, body)?;

    let hub = hub.get_ref().clone();
    actix_web::rt::spawn(run_session(hub, session, stream));

    Ok(response)
}

/// Parses an inbound text frame and publishes it on the channel.
pub fn publish_frame(hub: &ChatHub, text: &str) -> Result<Delivery, ChatError> {
    let InboundFrame::Message { sender_name, body } = InboundFrame::parse(text)?;
    hub.publish(&sender_name, &body)
}

/// Sends one frame. A frame that fails to serialize is logged and skipped;
/// only a closed session is an error.
async fn send_frame(
    session: &mut Session,
    participant: ParticipantId,
    frame: OutboundFrame,
) -> Result<(), actix_ws::Closed> {
    match frame.to_json() {
        Ok(text) => session.text(text).await,
        Err(e) => {
            log::error!("Could not encode frame for {}: {}", participant, e);
            Ok(())
        }
    }
}

async fn run_session(hub: ChatHub, mut session: Session, mut stream: MessageStream) {
    let mut subscription = hub.join();
    let participant = subscription.id();

    let reason: Option<CloseReason> = loop {
        tokio::select! {
            delivered = subscription.recv() => {
                let Some(message) = delivered else { break None };
                if send_frame(&mut session, participant, message.into()).await.is_err() {
                    break None;
                }
            }
            inbound = stream.next() => {
                let reply = match inbound {
                    Some(Ok(Message::Text(text))) => publish_frame(&hub, &text).err(),
                    Some(Ok(Message::Binary(_))) => Some(ChatError::Malformed(
                        "binary frames are not supported".to_string(),
                    )),
                    Some(Ok(Message::Ping(bytes))) => {
                        if session.pong(&bytes).await.is_err() {
                            break None;
                        }
                        None
                    }
                    Some(Ok(Message::Close(reason))) => break reason,
                    Some(Ok(_)) => None,
                    Some(Err(e)) => {
                        log::warn!("Websocket protocol error for {}: {}", participant, e);
                        break None;
                    }
                    None => break None,
                };

                if let Some(error) = reply {
                    log::debug!("Rejected frame from {}: {}", participant, error);
                    if send_frame(&mut session, participant, error.into()).await.is_err() {
                        break None;
                    }
                }
            }
        }
    };

    // Leave before closing so no further publishes target this session
    drop(subscription);
    let _ = session.close(reason).await;
}
