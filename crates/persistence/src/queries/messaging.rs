// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use fieldops_domain::{ConversationId, Message};

use crate::data_models::MessageRow;
use crate::diesel_schema::messages;
use crate::error::PersistenceError;

/// Lists the messages of a conversation, oldest first.
///
/// Ordering follows the server-assigned id, which is the order in which the
/// single writer accepted the messages.
///
/// # Errors
///
/// Returns an error if the query fails or a row is malformed.
pub fn list_messages(
    conn: &mut SqliteConnection,
    conversation_id: ConversationId,
) -> Result<Vec<Message>, PersistenceError> {
    let rows: Vec<MessageRow> = messages::table
        .filter(messages::conversation_id.eq(conversation_id.to_string()))
        .order(messages::message_id.asc())
        .select(MessageRow::as_select())
        .load(conn)?;
    rows.into_iter().map(Message::try_from).collect()
}

/// Finds one message by id.
///
/// # Errors
///
/// Returns an error if the query fails or the row is malformed.
pub fn find_message(
    conn: &mut SqliteConnection,
    message_id: i64,
) -> Result<Option<Message>, PersistenceError> {
    let row: Option<MessageRow> = messages::table
        .filter(messages::message_id.eq(message_id))
        .select(MessageRow::as_select())
        .first(conn)
        .optional()?;
    row.map(Message::try_from).transpose()
}
