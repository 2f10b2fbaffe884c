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

//! Session-level messages: Logon, Logout, keepalives, and sequence repair.

use ustr::Ustr;

use crate::{
    fields::tags,
    messages::{
        header::Header,
        msg_type,
        schema::{FieldSlot, impl_schema_elements},
    },
};

/// Logon(A).
#[derive(Debug)]
pub struct Logon {
    /// The standard header.
    pub header: Header,
    /// EncryptMethod(98); always `0` (none).
    pub encrypt_method: FieldSlot<i64>,
    /// HeartBtInt(108) in seconds.
    pub heart_bt_int: FieldSlot<i64>,
    /// ResetSeqNumFlag(141); always set on this client (sequence numbers
    /// restart with every session).
    pub reset_seq_num_flag: FieldSlot<bool>,
    /// Username(553).
    pub username: FieldSlot<Ustr>,
    /// Password(554).
    pub password: FieldSlot<Ustr>,
}

impl Logon {
    /// Creates an empty [`Logon`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            header: Header::new(msg_type::LOGON),
            encrypt_method: FieldSlot::new(tags::ENCRYPT_METHOD),
            heart_bt_int: FieldSlot::new(tags::HEART_BT_INT),
            reset_seq_num_flag: FieldSlot::new(tags::RESET_SEQ_NUM_FLAG),
            username: FieldSlot::new(tags::USERNAME),
            password: FieldSlot::new(tags::PASSWORD),
        }
    }
}

impl Default for Logon {
    fn default() -> Self {
        Self::new()
    }
}

impl_schema_elements!(
    Logon => header, encrypt_method, heart_bt_int, reset_seq_num_flag, username, password
);

/// Logout(5).
#[derive(Debug)]
pub struct Logout {
    /// The standard header.
    pub header: Header,
    /// Text(58) explaining the logout.
    pub text: FieldSlot<Ustr>,
}

impl Logout {
    /// Creates an empty [`Logout`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            header: Header::new(msg_type::LOGOUT),
            text: FieldSlot::new(tags::TEXT),
        }
    }
}

impl Default for Logout {
    fn default() -> Self {
        Self::new()
    }
}

impl_schema_elements!(Logout => header, text);

/// Heartbeat(0). Sent on the heartbeat interval, or in response to a
/// TestRequest (echoing TestReqID(112)).
#[derive(Debug)]
pub struct Heartbeat {
    /// The standard header.
    pub header: Header,
    /// TestReqID(112) when answering a TestRequest.
    pub test_req_id: FieldSlot<Ustr>,
}

impl Heartbeat {
    /// Creates an empty [`Heartbeat`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            header: Header::new(msg_type::HEARTBEAT),
            test_req_id: FieldSlot::new(tags::TEST_REQ_ID),
        }
    }
}

impl Default for Heartbeat {
    fn default() -> Self {
        Self::new()
    }
}

impl_schema_elements!(Heartbeat => header, test_req_id);

/// TestRequest(1).
#[derive(Debug)]
pub struct TestRequest {
    /// The standard header.
    pub header: Header,
    /// TestReqID(112); the peer must echo this in its Heartbeat.
    pub test_req_id: FieldSlot<Ustr>,
}

impl TestRequest {
    /// Creates an empty [`TestRequest`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            header: Header::new(msg_type::TEST_REQUEST),
            test_req_id: FieldSlot::new(tags::TEST_REQ_ID),
        }
    }
}

impl Default for TestRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl_schema_elements!(TestRequest => header, test_req_id);

/// ResendRequest(2).
#[derive(Debug)]
pub struct ResendRequest {
    /// The standard header.
    pub header: Header,
    /// BeginSeqNo(7).
    pub begin_seq_no: FieldSlot<u64>,
    /// EndSeqNo(16); `0` means infinity.
    pub end_seq_no: FieldSlot<u64>,
}

impl ResendRequest {
    /// Creates an empty [`ResendRequest`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            header: Header::new(msg_type::RESEND_REQUEST),
            begin_seq_no: FieldSlot::new(tags::BEGIN_SEQ_NO),
            end_seq_no: FieldSlot::new(tags::END_SEQ_NO),
        }
    }
}

impl Default for ResendRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl_schema_elements!(ResendRequest => header, begin_seq_no, end_seq_no);

/// Reject(3): session-level rejection of a message we sent.
#[derive(Debug)]
pub struct Reject {
    /// The standard header.
    pub header: Header,
    /// RefSeqNum(45): sequence number of the rejected message.
    pub ref_seq_num: FieldSlot<u64>,
    /// RefTagID(371).
    pub ref_tag_id: FieldSlot<u64>,
    /// RefMsgType(372).
    pub ref_msg_type: FieldSlot<Ustr>,
    /// SessionRejectReason(373).
    pub session_reject_reason: FieldSlot<i64>,
    /// Text(58).
    pub text: FieldSlot<Ustr>,
}

impl Reject {
    /// Creates an empty [`Reject`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            header: Header::new(msg_type::REJECT),
            ref_seq_num: FieldSlot::new(tags::REF_SEQ_NUM),
            ref_tag_id: FieldSlot::new(tags::REF_TAG_ID),
            ref_msg_type: FieldSlot::new(tags::REF_MSG_TYPE),
            session_reject_reason: FieldSlot::new(tags::SESSION_REJECT_REASON),
            text: FieldSlot::new(tags::TEXT),
        }
    }
}

impl Default for Reject {
    fn default() -> Self {
        Self::new()
    }
}

impl_schema_elements!(
    Reject => header, ref_seq_num, ref_tag_id, ref_msg_type, session_reject_reason, text
);

/// SequenceReset(4).
#[derive(Debug)]
pub struct SequenceReset {
    /// The standard header.
    pub header: Header,
    /// GapFillFlag(123).
    pub gap_fill_flag: FieldSlot<bool>,
    /// NewSeqNo(36).
    pub new_seq_no: FieldSlot<u64>,
}

impl SequenceReset {
    /// Creates an empty [`SequenceReset`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            header: Header::new(msg_type::SEQUENCE_RESET),
            gap_fill_flag: FieldSlot::new(tags::GAP_FILL_FLAG),
            new_seq_no: FieldSlot::new(tags::NEW_SEQ_NO),
        }
    }
}

impl Default for SequenceReset {
    fn default() -> Self {
        Self::new()
    }
}

impl_schema_elements!(SequenceReset => header, gap_fill_flag, new_seq_no);
