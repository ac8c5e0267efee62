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

use bcder::Oid;
use bytes::Bytes;
use x509_parser::prelude::{FromDer, X509Certificate};

/// An X.509 certificate held as its DER encoding.
///
/// Certificate hashes are computed over exactly these bytes, so the original
/// encoding is preserved and the certificate is re-parsed on demand when a
/// field needs to be inspected.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CertificateDer(Vec<u8>);

impl CertificateDer {
    /// Wrap a DER-encoded certificate.
    pub fn new(der: impl Into<Vec<u8>>) -> Self {
        Self(der.into())
    }

    /// Return the certificate's DER encoding.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Parse the certificate, or `None` if the bytes are not a valid DER
    /// certificate.
    pub(crate) fn parse(&self) -> Option<X509Certificate<'_>> {
        match X509Certificate::from_der(&self.0) {
            Ok((_, cert)) => Some(cert),
            Err(_) => None,
        }
    }
}

/// One signed (authenticated) attribute of a [`SignerInfo`]: an attribute
/// type and its DER-encoded attribute values.
#[derive(Clone, Debug)]
pub struct SignedAttribute {
    /// The attribute type OID.
    pub typ: Oid,

    /// The attribute values, each a DER-encoded structure.
    ///
    /// CMS allows a set of values per attribute; the attributes interpreted
    /// here must carry exactly one, which is enforced during validation
    /// rather than at construction.
    pub values: Vec<Bytes>,
}

/// The signer of a [`Signature`]: its claimed end-entity certificate and its
/// signed attributes.
#[derive(Clone, Debug)]
pub struct SignerInfo {
    /// The signer's end-entity certificate. A signer without one fails
    /// validation immediately.
    pub certificate: Option<CertificateDer>,

    /// The signer's signed attributes, in no particular order.
    pub signed_attributes: Vec<SignedAttribute>,
}

/// One cryptographic signature over a package, as extracted from a CMS
/// `SignedData` structure by an upstream parser.
///
/// Immutable once constructed; validation never modifies a signature.
#[derive(Clone, Debug)]
pub struct Signature {
    /// Certificates embedded alongside the signature. Untrusted and not
    /// necessarily in chain order; consulted only to complete a certificate
    /// path.
    pub certificates: Vec<CertificateDer>,

    /// The signer of this signature.
    pub signer_info: SignerInfo,

    /// Time stamp countersignatures, each itself a nested signature over
    /// this one.
    pub timestamps: Vec<Signature>,
}
