// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! The standard message header component.

use chrono::{DateTime, Utc};
use ustr::Ustr;

use crate::{
    fields::tags,
    messages::schema::{FieldSlot, impl_schema_elements},
};

/// The standard header carried by every message: MsgType(35),
/// SenderCompID(49), TargetCompID(56), MsgSeqNum(34), SendingTime(52), and
/// the optional PossDupFlag(43).
///
/// BeginString(8), BodyLength(9), and CheckSum(10) are framing, not schema;
/// they are produced and validated by the codec.
#[derive(Debug)]
pub struct Header {
    /// MsgType(35).
    pub msg_type: FieldSlot<Ustr>,
    /// SenderCompID(49).
    pub sender_comp_id: FieldSlot<Ustr>,
    /// TargetCompID(56).
    pub target_comp_id: FieldSlot<Ustr>,
    /// MsgSeqNum(34), assigned by the transport on send.
    pub msg_seq_num: FieldSlot<u64>,
    /// SendingTime(52), UTC.
    pub sending_time: FieldSlot<DateTime<Utc>>,
    /// PossDupFlag(43).
    pub poss_dup_flag: FieldSlot<bool>,
}

impl Header {
    /// Creates a header with MsgType(35) preset.
    #[must_use]
    pub fn new(msg_type: &str) -> Self {
        let mut header = Self::empty();
        header.msg_type.set(Ustr::from(msg_type));
        header
    }

    /// Creates an entirely empty header (decode path).
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            msg_type: FieldSlot::new(tags::MSG_TYPE),
            sender_comp_id: FieldSlot::new(tags::SENDER_COMP_ID),
            target_comp_id: FieldSlot::new(tags::TARGET_COMP_ID),
            msg_seq_num: FieldSlot::new(tags::MSG_SEQ_NUM),
            sending_time: FieldSlot::new(tags::SENDING_TIME),
            poss_dup_flag: FieldSlot::new(tags::POSS_DUP_FLAG),
        }
    }
}

impl_schema_elements!(
    Header => msg_type, sender_comp_id, target_comp_id, msg_seq_num, sending_time, poss_dup_flag
);

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rstest::rstest;

    use super::*;
    use crate::messages::schema::SchemaElement;

    #[rstest]
    fn test_header_encode_order() {
        let mut header = Header::new("A");
        header.sender_comp_id.set(Ustr::from("SENDER"));
        header.target_comp_id.set(Ustr::from("TARGET"));
        header.msg_seq_num.set(1);
        header
            .sending_time
            .set(Utc.with_ymd_and_hms(2025, 3, 22, 12, 34, 56).unwrap());

        let mut buf = Vec::new();
        header.encode(&mut buf);
        assert_eq!(
            buf,
            b"35=A\x0149=SENDER\x0156=TARGET\x0134=1\x0152=20250322-12:34:56.000\x01"
        );
    }
}
