// Copyright 2024 Adobe. All rights reserved.
// This file is licensed to you under the Apache License,
// Version 2.0 (http://www.apache.org/licenses/LICENSE-2.0)
// or the MIT license (http://opensource.org/licenses/MIT),
// at your option.

// Unless required by applicable law or agreed to in writing,
// this software is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR REPRESENTATIONS OF ANY KIND, either express or
// implied. See the LICENSE-MIT and LICENSE-APACHE files for the
// specific language governing permissions and limitations under
// each license.

//! Diagnostic codes reported with signing-certificate validation failures.
//!
//! The same failure condition surfaces a different code depending on whether
//! the primary signature or a time stamp countersignature was being
//! validated, so callers can present context-specific diagnostics.

// -- primary signature codes --

/// The primary signature's signer does not carry a signing certificate.
pub const SIGNING_CREDENTIAL_MISSING: &str = "signingCredential.missing";

/// The primary signature violates the signing-certificate binding rules.
pub const SIGNING_CREDENTIAL_INVALID: &str = "signingCredential.invalid";

/// No complete certificate chain could be built for the primary signature's
/// signing certificate.
pub const SIGNING_CREDENTIAL_CHAIN_INCOMPLETE: &str = "signingCredential.chainIncomplete";

// -- time stamp codes --

/// The time stamp's signer does not carry a signing certificate.
pub const TIMESTAMP_CREDENTIAL_MISSING: &str = "timeStamp.signingCredential.missing";

/// The time stamp signature violates the signing-certificate binding rules.
pub const TIMESTAMP_CREDENTIAL_INVALID: &str = "timeStamp.signingCredential.invalid";

/// No complete certificate chain could be built for the time stamp's signing
/// certificate.
pub const TIMESTAMP_CREDENTIAL_CHAIN_INCOMPLETE: &str =
    "timeStamp.signingCredential.chainIncomplete";
