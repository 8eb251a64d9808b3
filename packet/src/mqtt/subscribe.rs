//! SUBSCRIBE, SUBACK and UNSUBSCRIBE.

use std::fmt;

use bytes::{BufMut, BytesMut};

use super::types::QoS;
use crate::codec::{Reader, write_string, write_u16};
use crate::error::{Error, Result};

/// Subscribe filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscribeFilter {
    pub topic: String,
    pub qos: QoS,
}

impl SubscribeFilter {
    pub fn new(topic: impl Into<String>, qos: QoS) -> Self {
        Self {
            topic: topic.into(),
            qos,
        }
    }
}

/// SUBSCRIBE packet.
///
/// Filters go on the wire in the order they are stored.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Subscribe {
    pub pkid: u16,
    pub filters: Vec<SubscribeFilter>,
}

impl Subscribe {
    pub fn new(pkid: u16, filters: Vec<SubscribeFilter>) -> Self {
        Self { pkid, filters }
    }

    /// Subscribe to a single topic at QoS 0.
    pub fn from_topic(pkid: u16, topic: impl Into<String>) -> Self {
        Self::new(pkid, vec![SubscribeFilter::new(topic, QoS::AtMostOnce)])
    }

    /// Subscribe to several topics at QoS 0, keeping their order.
    pub fn from_topics<I, T>(pkid: u16, topics: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let filters = topics
            .into_iter()
            .map(|t| SubscribeFilter::new(t, QoS::AtMostOnce))
            .collect();
        Self::new(pkid, filters)
    }

    /// Subscribe to `(topic, qos)` pairs, keeping their order.
    pub fn from_pairs<I, T>(pkid: u16, pairs: I) -> Self
    where
        I: IntoIterator<Item = (T, QoS)>,
        T: Into<String>,
    {
        let filters = pairs
            .into_iter()
            .map(|(t, qos)| SubscribeFilter::new(t, qos))
            .collect();
        Self::new(pkid, filters)
    }

    /// Subscribe to the entries of a map.
    ///
    /// Unlike the other constructors this sorts the filters by topic, so the
    /// wire order does not depend on the map's iteration order.
    pub fn from_map<I, T>(pkid: u16, map: I) -> Self
    where
        I: IntoIterator<Item = (T, QoS)>,
        T: Into<String>,
    {
        let mut subscribe = Self::from_pairs(pkid, map);
        subscribe.filters.sort_by(|a, b| a.topic.cmp(&b.topic));
        subscribe
    }

    pub(crate) fn read_body(buf: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(buf);
        let pkid = reader.read_u16()?;

        let mut filters = Vec::new();
        while !reader.is_empty() {
            let topic = reader.read_string()?;
            let qos = QoS::try_from(reader.read_u8()?)?;
            filters.push(SubscribeFilter { topic, qos });
        }

        Ok(Subscribe { pkid, filters })
    }

    pub(crate) fn write_body(&self, buf: &mut BytesMut) -> Result<()> {
        if self.filters.is_empty() {
            return Err(Error::MissingField("topics"));
        }

        write_u16(buf, self.pkid);
        for filter in &self.filters {
            write_string(buf, &filter.topic)?;
            buf.put_u8(filter.qos as u8);
        }
        Ok(())
    }
}

impl fmt::Display for Subscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let filters: Vec<String> = self
            .filters
            .iter()
            .map(|filter| format!("'{}':{}", filter.topic, filter.qos))
            .collect();
        write!(f, "Subscribe: 0x{:02X}, {}", self.pkid, filters.join(", "))
    }
}

// ============================================================================
// SUBACK
// ============================================================================

/// SUBACK packet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubAck {
    pub pkid: u16,
    /// One return code per requested filter, in request order.
    pub return_codes: Vec<u8>,
}

impl SubAck {
    pub fn new(pkid: u16, return_codes: Vec<u8>) -> Self {
        Self { pkid, return_codes }
    }

    pub(crate) fn read_body(buf: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(buf);
        let pkid = reader.read_u16()?;
        let return_codes = reader.rest().to_vec();
        Ok(SubAck { pkid, return_codes })
    }

    pub(crate) fn write_body(&self, buf: &mut BytesMut) -> Result<()> {
        if self.return_codes.is_empty() {
            return Err(Error::MissingField("granted QoS"));
        }

        write_u16(buf, self.pkid);
        buf.put_slice(&self.return_codes);
        Ok(())
    }
}

impl fmt::Display for SubAck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let codes: Vec<String> = self
            .return_codes
            .iter()
            .map(|rc| format!("0x{:02X}", rc))
            .collect();
        write!(f, "Suback: 0x{:02X}, rc={}", self.pkid, codes.join(","))
    }
}

// ============================================================================
// UNSUBSCRIBE
// ============================================================================

/// UNSUBSCRIBE packet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Unsubscribe {
    pub pkid: u16,
    pub topics: Vec<String>,
}

impl Unsubscribe {
    pub fn new<I, T>(pkid: u16, topics: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            pkid,
            topics: topics.into_iter().map(Into::into).collect(),
        }
    }

    pub(crate) fn read_body(buf: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(buf);
        let pkid = reader.read_u16()?;

        let mut topics = Vec::new();
        while !reader.is_empty() {
            topics.push(reader.read_string()?);
        }

        Ok(Unsubscribe { pkid, topics })
    }

    pub(crate) fn write_body(&self, buf: &mut BytesMut) -> Result<()> {
        if self.topics.is_empty() {
            return Err(Error::MissingField("topics"));
        }

        write_u16(buf, self.pkid);
        for topic in &self.topics {
            write_string(buf, topic)?;
        }
        Ok(())
    }
}

impl fmt::Display for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let topics: Vec<String> = self.topics.iter().map(|t| format!("'{}'", t)).collect();
        write!(f, "Unsubscribe: 0x{:02X}, {}", self.pkid, topics.join(", "))
    }
}
