// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request execution for the Warden egress guard.
//!
//! A request is classified once, then sent either through the native
//! reqwest client (direct path) or as hand-framed HTTP/1.1 bytes through a
//! CONNECT tunnel (proxy path). Both paths accumulate the response into a
//! fixed-capacity [`ResponseBuffer`].

pub mod deframe;
pub mod direct;
pub mod dispatch;
pub mod frame;
pub mod tunnel;
pub mod url;

pub use deframe::{deframe, parse_status, read_to_end, RawHttpResponse};
pub use direct::ReqwestNativeClient;
pub use dispatch::{DispatchLimits, DispatchOutcome, Dispatcher, ProxyMode, Route};
pub use frame::{build_request, FramedRequest};
pub use tunnel::{ConnectProxyConnector, NoProxyConnector};
pub use url::{decompose, ParsedUrl};
pub use warden_core::ResponseBuffer;
