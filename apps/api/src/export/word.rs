//! Legacy word-processor serializer: the standalone HTML behind a UTF-8 byte-order mark,
//! delivered as `application/msword` so word processors open it as a document.

use crate::export::html;
use crate::models::document::Document;

pub const BYTE_ORDER_MARK: [u8; 3] = [0xEF, 0xBB, 0xBF];

pub fn serialize(document: &Document) -> Vec<u8> {
    let html = html::serialize(document);
    let mut payload = Vec::with_capacity(BYTE_ORDER_MARK.len() + html.len());
    payload.extend_from_slice(&BYTE_ORDER_MARK);
    payload.extend_from_slice(html.as_bytes());
    payload
}
