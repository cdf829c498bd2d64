use serde::Serialize;
use crate::parser::Event;

pub const WRITE_CODE: char = 'W';

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Operation { Open, Close, Read, Write, Delete }

impl Operation {
    pub fn from_code(c: char) -> Option<Operation> {
        match c {
            'O' => Some(Operation::Open),
            'C' => Some(Operation::Close),
            'R' => Some(Operation::Read),
            'W' => Some(Operation::Write),
            'D' => Some(Operation::Delete),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DecodedEvent {
    pub event: Event,
    pub operations: Vec<Operation>,
    /// Every code in input order, including the ones with no mapping.
    pub raw_operations: Vec<char>,
}

impl DecodedEvent {
    pub fn is_write(&self) -> bool { self.raw_operations.contains(&WRITE_CODE) }
}

pub fn decode_operations(raw: &str) -> (Vec<Operation>, Vec<char>) {
    let raw_ops: Vec<char> = raw.chars().collect();
    let ops = raw_ops.iter().filter_map(|c| Operation::from_code(*c)).collect();
    (ops, raw_ops)
}

pub fn decode_event(event: Event) -> DecodedEvent {
    let (operations, raw_operations) = decode_operations(&event.raw_operation);
    DecodedEvent { event, operations, raw_operations }
}
