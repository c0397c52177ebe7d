// Query engine — linear filters over the message collection
//
// Both queries borrow the messages and preserve their order. An empty result
// means "none found" and is not an error.

use crate::message::Message;

/// Messages sent by `sender` to `receiver` (exact, case-sensitive match)
pub fn filter_by_sender_and_receiver<'a>(
    messages: &'a [Message],
    sender: &str,
    receiver: &str,
) -> Vec<&'a Message> {
    messages
        .iter()
        .filter(|m| m.sender_name == sender && m.receiver_name == receiver)
        .collect()
}

/// Messages whose body contains `word` as a contiguous, case-sensitive
/// substring. An empty `word` matches everything.
pub fn search_by_word<'a>(messages: &'a [Message], word: &str) -> Vec<&'a Message> {
    messages.iter().filter(|m| m.body.contains(word)).collect()
}
