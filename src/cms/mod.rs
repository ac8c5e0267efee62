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

//! Signing-certificate binding validation for [CMS] package signatures.
//!
//! [CMS]: https://datatracker.ietf.org/doc/html/rfc5652

mod chain;
pub use chain::{ChainBuilder, UntrustedChainBuilder};

mod commitment;
pub use commitment::CommitmentType;

mod error;
pub use error::SignatureError;

mod signature;
pub use signature::{CertificateDer, SignedAttribute, Signature, SignerInfo};

mod signing_certificate;
pub use signing_certificate::{
    primary_signing_certificates, timestamp_signing_certificates, AllowedHashAlgorithms,
};
