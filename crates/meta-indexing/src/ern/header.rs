//! MessageHeader section.

use meta_types::{Cid, Object};
use rusqlite::params;

use super::parties::insert_single_party;
use crate::error::IndexingError;
use crate::graph::TEXT_FIELD;
use crate::indexer::IndexContext;

/// Index the message header: its sender and recipient parties and one `ern`
/// row for the whole message.
pub(super) fn index_message_header(
    cx: &mut IndexContext<'_>,
    ern: &Cid,
    header: &Object,
) -> Result<(), IndexingError> {
    let sender = insert_single_party(cx, header, "MessageSender")?;
    let recipient = insert_single_party(cx, header, "MessageRecipient")?;

    let graph = cx.graph(header);
    let message_id = graph.text(&["MessageId", TEXT_FIELD])?;
    let thread_id = graph.text(&["MessageThreadId", TEXT_FIELD])?;
    let created = graph.text(&["MessageCreatedDateTime", TEXT_FIELD])?;

    cx.insert(
        "ern",
        "INSERT INTO ern (cid, message_id, thread_id, sender_id, recipient_id, created)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            ern.to_string(),
            message_id,
            thread_id,
            sender.to_string(),
            recipient.to_string(),
            created
        ],
    )?;
    Ok(())
}
