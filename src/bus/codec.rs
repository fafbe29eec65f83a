//! # Message Codec
//!
//! Every actor speaks the same flat wire format: `/`-separated fields, with vectors
//! encoded as `;`-joined integers addressed by position (index = part or product id).
//! Frames are decoded exactly once, at the bus boundary, into a [`Message`].
//!
//! The `warehouse` channel carries two shapes that share no leading tag: the
//! Supplier's `receive_parts/<payload>` and a Line's
//! `<line>/<factory>/send_parts/<payload>`. They are told apart by field position,
//! the same way every other participant on that channel does it.

use crate::bus::Channel;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while decoding a wire frame.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CodecError {
    #[error("Empty frame")]
    Empty,

    #[error("Unknown command '{command}' on {channel}")]
    UnknownCommand { channel: Channel, command: String },

    #[error("Frame '{command}' is missing field '{field}'")]
    MissingField { command: String, field: &'static str },

    #[error("Field '{field}' is not a number: '{value}'")]
    InvalidNumber { field: &'static str, value: String },
}

/// The (line, factory) pair a line-channel message is addressed to or sent from.
///
/// Line ids are 1-based within their factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineAddress {
    pub line: u32,
    pub factory: u32,
}

impl LineAddress {
    pub fn new(line: u32, factory: u32) -> Self {
        Self { line, factory }
    }
}

impl Display for LineAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line-{}-{}", self.factory, self.line)
    }
}

/// A decoded protocol message.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Factory → Line: build `quantity` units of `product`.
    ProductionOrder {
        to: LineAddress,
        product: usize,
        quantity: i64,
    },
    /// Warehouse → Line: replenishment, one amount per part.
    LineShipment { to: LineAddress, parts: Vec<i64> },
    /// Supplier → Warehouse: replenishment, one amount per part.
    SupplierShipment { parts: Vec<i64> },
    /// Line → Warehouse: which parts the line needs.
    PartsRequest { from: LineAddress, flags: Vec<bool> },
    /// Warehouse → Supplier: which parts the warehouse needs.
    SupplierRequest { flags: Vec<bool> },
    /// Line → Finished goods: `quantity` units of `product` were built.
    ProductsDelivered {
        product: usize,
        from: LineAddress,
        quantity: i64,
    },
    /// Finished goods → every Factory: post-sale stock per product.
    StockStatus { stock: Vec<i64> },
}

impl Message {
    /// The channel this message travels on.
    pub fn channel(&self) -> Channel {
        match self {
            Message::ProductionOrder { .. } | Message::LineShipment { .. } => Channel::Line,
            Message::SupplierShipment { .. } | Message::PartsRequest { .. } => Channel::Warehouse,
            Message::SupplierRequest { .. } => Channel::Supplier,
            Message::ProductsDelivered { .. } => Channel::ProductStock,
            Message::StockStatus { .. } => Channel::Factory,
        }
    }

    /// The line this message is addressed to, for messages on the shared line channel.
    pub fn recipient(&self) -> Option<LineAddress> {
        match self {
            Message::ProductionOrder { to, .. } | Message::LineShipment { to, .. } => Some(*to),
            _ => None,
        }
    }

    /// Render the wire frame.
    pub fn encode(&self) -> String {
        match self {
            Message::ProductionOrder {
                to,
                product,
                quantity,
            } => format!("receive_order/{}/{}/{}/{}", to.line, to.factory, product, quantity),
            Message::LineShipment { to, parts } => format!(
                "receive_parts/{}/{}/{}",
                to.line,
                to.factory,
                encode_vector(parts)
            ),
            Message::SupplierShipment { parts } => {
                format!("receive_parts/{}", encode_vector(parts))
            }
            Message::PartsRequest { from, flags } => format!(
                "{}/{}/send_parts/{}",
                from.line,
                from.factory,
                encode_flags(flags)
            ),
            Message::SupplierRequest { flags } => format!("send_parts/{}", encode_flags(flags)),
            Message::ProductsDelivered {
                product,
                from,
                quantity,
            } => format!(
                "receive_products/{}/{}/{}/{}",
                product, from.line, from.factory, quantity
            ),
            Message::StockStatus { stock } => format!("update_factory/{}", encode_vector(stock)),
        }
    }

    /// Decode a frame received on `channel`.
    pub fn decode(channel: Channel, frame: &str) -> Result<Self, CodecError> {
        if frame.is_empty() {
            return Err(CodecError::Empty);
        }
        let fields = Fields::new(frame);
        let command = fields.command();

        match (channel, command) {
            (Channel::Line, "receive_order") => Ok(Message::ProductionOrder {
                to: fields.address(1, 2)?,
                product: fields.number(3, "product")?,
                quantity: fields.number(4, "quantity")?,
            }),
            (Channel::Line, "receive_parts") => Ok(Message::LineShipment {
                to: fields.address(1, 2)?,
                parts: decode_vector(fields.get(3, "parts")?, "parts")?,
            }),
            (Channel::Warehouse, "receive_parts") => Ok(Message::SupplierShipment {
                parts: decode_vector(fields.get(1, "parts")?, "parts")?,
            }),
            (Channel::Warehouse, _) if fields.len() > 2 && fields.raw(2) == Some("send_parts") => {
                Ok(Message::PartsRequest {
                    from: fields.address(0, 1)?,
                    flags: decode_flags(fields.get(3, "flags")?)?,
                })
            }
            (Channel::Supplier, "send_parts") => Ok(Message::SupplierRequest {
                flags: decode_flags(fields.get(1, "flags")?)?,
            }),
            (Channel::ProductStock, "receive_products") => Ok(Message::ProductsDelivered {
                product: fields.number(1, "product")?,
                from: fields.address(2, 3)?,
                quantity: fields.number(4, "quantity")?,
            }),
            (Channel::Factory, "update_factory") => Ok(Message::StockStatus {
                stock: decode_vector(fields.get(1, "stock")?, "stock")?,
            }),
            (channel, command) => Err(CodecError::UnknownCommand {
                channel,
                command: command.to_string(),
            }),
        }
    }
}

/// Positional view over a `/`-separated frame.
struct Fields<'a> {
    parts: Vec<&'a str>,
}

impl<'a> Fields<'a> {
    fn new(frame: &'a str) -> Self {
        Self {
            parts: frame.split('/').collect(),
        }
    }

    fn len(&self) -> usize {
        self.parts.len()
    }

    fn command(&self) -> &'a str {
        self.parts.first().copied().unwrap_or_default()
    }

    fn raw(&self, index: usize) -> Option<&'a str> {
        self.parts.get(index).copied()
    }

    fn get(&self, index: usize, field: &'static str) -> Result<&'a str, CodecError> {
        self.raw(index).ok_or_else(|| CodecError::MissingField {
            command: self.command().to_string(),
            field,
        })
    }

    fn number<T: FromStr>(&self, index: usize, field: &'static str) -> Result<T, CodecError> {
        parse_number(self.get(index, field)?, field)
    }

    fn address(&self, line: usize, factory: usize) -> Result<LineAddress, CodecError> {
        Ok(LineAddress {
            line: self.number(line, "line")?,
            factory: self.number(factory, "factory")?,
        })
    }
}

fn parse_number<T: FromStr>(value: &str, field: &'static str) -> Result<T, CodecError> {
    value.trim().parse().map_err(|_| CodecError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

/// Join integers with `;`.
pub fn encode_vector(values: &[i64]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(";")
}

/// Split a `;`-joined vector. Empty items are skipped.
pub fn decode_vector(payload: &str, field: &'static str) -> Result<Vec<i64>, CodecError> {
    payload
        .split(';')
        .filter(|item| !item.is_empty())
        .map(|item| parse_number(item, field))
        .collect()
}

/// Flags go over the wire as `1`/`0`.
pub fn encode_flags(flags: &[bool]) -> String {
    flags
        .iter()
        .map(|&f| if f { "1" } else { "0" })
        .collect::<Vec<_>>()
        .join(";")
}

/// Any non-zero entry is a raised flag.
pub fn decode_flags(payload: &str) -> Result<Vec<bool>, CodecError> {
    Ok(decode_vector(payload, "flags")?
        .into_iter()
        .map(|v| v != 0)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_order_frame() {
        let msg = Message::ProductionOrder {
            to: LineAddress::new(3, 2),
            product: 4,
            quantity: 96,
        };
        assert_eq!(msg.encode(), "receive_order/3/2/4/96");
        assert_eq!(msg.channel(), Channel::Line);
        assert_eq!(Message::decode(Channel::Line, "receive_order/3/2/4/96"), Ok(msg));
    }

    #[test]
    fn test_line_shipment_is_addressed() {
        let msg = Message::decode(Channel::Line, "receive_parts/1/2/0;1440;0").unwrap();
        assert_eq!(msg.recipient(), Some(LineAddress::new(1, 2)));
        assert_eq!(
            msg,
            Message::LineShipment {
                to: LineAddress::new(1, 2),
                parts: vec![0, 1440, 0],
            }
        );
    }

    #[test]
    fn test_warehouse_channel_shapes() {
        // Two fields, leading command: from the supplier
        let from_supplier = Message::decode(Channel::Warehouse, "receive_parts/5;0;5").unwrap();
        assert_eq!(from_supplier, Message::SupplierShipment { parts: vec![5, 0, 5] });

        // Four fields, command in third position: from a line
        let from_line = Message::decode(Channel::Warehouse, "4/1/send_parts/1;0;1").unwrap();
        assert_eq!(
            from_line,
            Message::PartsRequest {
                from: LineAddress::new(4, 1),
                flags: vec![true, false, true],
            }
        );
        assert_eq!(from_line.encode(), "4/1/send_parts/1;0;1");

        let unknown = Message::decode(Channel::Warehouse, "4/1/something/1");
        assert!(matches!(unknown, Err(CodecError::UnknownCommand { .. })));
    }

    #[test]
    fn test_same_command_differs_by_channel() {
        // On the line channel `receive_parts` must carry a full line address
        assert_eq!(
            Message::decode(Channel::Line, "receive_parts/1"),
            Err(CodecError::MissingField {
                command: "receive_parts".into(),
                field: "factory",
            })
        );
    }

    #[test]
    fn test_products_and_status_frames() {
        let delivered = Message::ProductsDelivered {
            product: 2,
            from: LineAddress::new(7, 2),
            quantity: 48,
        };
        assert_eq!(delivered.encode(), "receive_products/2/7/2/48");
        assert_eq!(
            Message::decode(Channel::ProductStock, "receive_products/2/7/2/48"),
            Ok(delivered)
        );

        let status = Message::decode(Channel::Factory, "update_factory/1000;950;0").unwrap();
        assert_eq!(status, Message::StockStatus { stock: vec![1000, 950, 0] });
        assert_eq!(status.channel(), Channel::Factory);
    }

    #[test]
    fn test_supplier_request_flags() {
        let msg = Message::decode(Channel::Supplier, "send_parts/0;2;1").unwrap();
        assert_eq!(msg, Message::SupplierRequest { flags: vec![false, true, true] });
        assert_eq!(msg.encode(), "send_parts/0;1;1");
    }

    #[test]
    fn test_malformed_frames() {
        assert_eq!(Message::decode(Channel::Line, ""), Err(CodecError::Empty));
        assert_eq!(
            Message::decode(Channel::Line, "receive_order/x/1/0/10"),
            Err(CodecError::InvalidNumber { field: "line", value: "x".into() })
        );
        assert_eq!(
            Message::decode(Channel::Supplier, "send_parts/1;a"),
            Err(CodecError::InvalidNumber { field: "flags", value: "a".into() })
        );
        assert!(matches!(
            Message::decode(Channel::Factory, "receive_order/1/1/0/10"),
            Err(CodecError::UnknownCommand { channel: Channel::Factory, .. })
        ));
    }

    #[test]
    fn test_empty_vector_items_are_skipped() {
        assert_eq!(decode_vector("1;;2;", "parts"), Ok(vec![1, 2]));
        assert_eq!(decode_vector("", "parts"), Ok(vec![]));
    }
}
