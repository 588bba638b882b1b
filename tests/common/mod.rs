#![allow(dead_code)]

use bookflow::interfaces::stripe::signature::signature_header;
use chrono::Utc;
use std::io::Write;
use tempfile::NamedTempFile;

pub const WEBHOOK_SECRET: &str = "whsec_test";

/// A catalog with one room type: id 1, capacity 2, 250.00 per night,
/// inventory 5.
pub fn write_catalog() -> NamedTempFile {
    write_catalog_with(
        r#"[{"id":1,"capacity":2,"pricePerNight":"250.00","totalInventory":5,
             "hotel":{"name":"Grand Plaza","city":"Madrid","image":"plaza.jpg"}}]"#,
    )
}

pub fn write_catalog_with(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// One JSON command per line.
pub fn write_commands(lines: &[String]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    file.flush().unwrap();
    file
}

pub fn create_command(user: &str, check_in: &str, check_out: &str) -> String {
    format!(
        r#"{{"op":"create","principal":{{"user":"{user}"}},"request":{{"roomTypeId":1,"checkIn":"{check_in}","checkOut":"{check_out}","guestCount":2,"guestNames":["Alice","Bob"]}}}}"#
    )
}

pub fn succeeded_event(reservation_id: u64) -> String {
    format!(
        r#"{{"id":"evt_{reservation_id}","type":"payment_intent.succeeded","data":{{"object":{{"metadata":{{"reservationId":"{reservation_id}"}}}}}}}}"#
    )
}

/// A webhook command whose body is signed with `secret`.
pub fn webhook_command(secret: &str, body: &str) -> String {
    let header = signature_header(secret, Utc::now().timestamp(), body.as_bytes());
    let encoded_body = serde_json::to_string(body).unwrap();
    format!(r#"{{"op":"webhook","body":{encoded_body},"signature":"{header}"}}"#)
}
