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

use thiserror::Error;

/// Describes errors that can occur while resolving and validating the
/// signing certificates of a CMS signature.
///
/// Every failure is terminal for the call: either a fully validated
/// certificate list is returned or one of these errors is, never a partial
/// result. The `code` fields carry the diagnostic code selected for the
/// calling context (primary signature vs. time stamp); see
/// [`crate::validation_codes`].
#[derive(Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum SignatureError {
    /// The signer does not carry a signing certificate.
    #[error("{code}: {message}")]
    NoCertificate {
        /// Context-specific diagnostic code.
        code: &'static str,

        /// Context-specific diagnostic message.
        message: &'static str,
    },

    /// The signature violates the signing-certificate binding rules.
    ///
    /// This covers duplicate or multi-valued attributes, attributes that a
    /// commitment type requires or forbids, disallowed hash algorithms,
    /// failed certificate or issuer-serial matches, and malformed attribute
    /// content.
    #[error("{code}: {reason}")]
    InvalidSignature {
        /// Context-specific diagnostic code.
        code: &'static str,

        /// Description of the specific violation.
        reason: String,
    },

    /// No complete certificate chain could be built for the signing
    /// certificate.
    #[error("{code}: unable to build a certificate chain for the signing certificate")]
    ChainBuildingFailed {
        /// Context-specific diagnostic code.
        code: &'static str,
    },

    /// No time stamp countersignature is present on the signature.
    #[error("the signature does not contain a time stamp countersignature")]
    TimestampMissing,
}
