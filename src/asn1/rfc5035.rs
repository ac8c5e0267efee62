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

//! ASN.1 types defined in [RFC 2634] and [RFC 5035] (Enhanced Security
//! Services): the signing-certificate and signing-certificate-v2 attribute
//! values that bind a CMS signature to specific certificates.
//!
//! [RFC 2634]: https://datatracker.ietf.org/doc/html/rfc2634
//! [RFC 5035]: https://datatracker.ietf.org/doc/html/rfc5035

use std::convert::Infallible;

use bcder::{
    decode::{Constructed, DecodeError, Source},
    Captured, ConstOid, Mode, OctetString, Oid, Tag,
};
use bytes::Bytes;

/// id-aa-signingCertificate from RFC 2634 § 5.4.
///
/// 1.2.840.113549.1.9.16.2.12
pub const OID_SIGNING_CERTIFICATE: ConstOid =
    Oid(&[42, 134, 72, 134, 247, 13, 1, 9, 16, 2, 12]);

/// id-aa-signingCertificateV2 from RFC 5035 § 3.
///
/// 1.2.840.113549.1.9.16.2.47
pub const OID_SIGNING_CERTIFICATE_V2: ConstOid =
    Oid(&[42, 134, 72, 134, 247, 13, 1, 9, 16, 2, 47]);

/// id-sha256; the DEFAULT hash algorithm of `ESSCertIDv2`.
///
/// 2.16.840.1.101.3.4.2.1
pub const OID_SHA256: ConstOid = Oid(&[96, 134, 72, 1, 101, 3, 4, 2, 1]);

/// A signing-certificate attribute value as defined in RFC 2634 § 5.4.
///
/// ```text
/// SigningCertificate ::= SEQUENCE {
///     certs       SEQUENCE OF ESSCertID,
///     policies    SEQUENCE OF PolicyInformation OPTIONAL }
/// ```
#[derive(Clone, Debug)]
pub struct SigningCertificate {
    /// Claimed certificate identifiers, leaf first.
    pub certs: Vec<EssCertId>,
}

impl SigningCertificate {
    /// Decode a DER-encoded attribute value.
    pub fn parse(data: Bytes) -> Result<Self, DecodeError<Infallible>> {
        Constructed::decode(data, Mode::Der, Self::take_from)
    }

    /// Parse a value from the beginning of a constructed value.
    pub fn take_from<S: Source>(
        cons: &mut Constructed<S>,
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            let certs = take_cert_sequence(cons, EssCertId::take_opt_from)?;

            // policies, not interpreted
            cons.take_opt_sequence(|cons| cons.capture_all())?;

            Ok(SigningCertificate { certs })
        })
    }
}

/// A signing-certificate-v2 attribute value as defined in RFC 5035 § 3.
///
/// ```text
/// SigningCertificateV2 ::= SEQUENCE {
///     certs       SEQUENCE OF ESSCertIDv2,
///     policies    SEQUENCE OF PolicyInformation OPTIONAL }
/// ```
#[derive(Clone, Debug)]
pub struct SigningCertificateV2 {
    /// Claimed certificate identifiers, leaf first.
    pub certs: Vec<EssCertIdV2>,
}

impl SigningCertificateV2 {
    /// Decode a DER-encoded attribute value.
    pub fn parse(data: Bytes) -> Result<Self, DecodeError<Infallible>> {
        Constructed::decode(data, Mode::Der, Self::take_from)
    }

    /// Parse a value from the beginning of a constructed value.
    pub fn take_from<S: Source>(
        cons: &mut Constructed<S>,
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            let certs = take_cert_sequence(cons, EssCertIdV2::take_opt_from)?;

            // policies, not interpreted
            cons.take_opt_sequence(|cons| cons.capture_all())?;

            Ok(SigningCertificateV2 { certs })
        })
    }
}

/// Parses a `SEQUENCE OF` certificate identifiers, requiring at least one
/// entry as RFC 5035 does (`SEQUENCE SIZE (1..MAX)`).
fn take_cert_sequence<S: Source, T>(
    cons: &mut Constructed<S>,
    take_opt: impl Fn(&mut Constructed<S>) -> Result<Option<T>, DecodeError<S::Error>>,
) -> Result<Vec<T>, DecodeError<S::Error>> {
    let certs = cons.take_sequence(|cons| {
        let mut certs = Vec::new();
        while let Some(id) = take_opt(cons)? {
            certs.push(id);
        }
        Ok(certs)
    })?;

    if certs.is_empty() {
        return Err(cons.content_err("certificate identifier sequence is empty"));
    }

    Ok(certs)
}

/// One claimed certificate identity from RFC 2634 § 5.4.1.
///
/// ```text
/// ESSCertID ::= SEQUENCE {
///     certHash        Hash,           -- SHA1 hash of entire certificate
///     issuerSerial    IssuerSerial OPTIONAL }
/// ```
#[derive(Clone, Debug)]
pub struct EssCertId {
    /// SHA-1 digest of the certificate's DER encoding.
    pub cert_hash: OctetString,

    /// Issuer and serial number of the claimed certificate.
    pub issuer_serial: Option<IssuerSerial>,
}

impl EssCertId {
    /// Parse an optional value from the beginning of a constructed value.
    pub fn take_opt_from<S: Source>(
        cons: &mut Constructed<S>,
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        cons.take_opt_sequence(|cons| {
            Ok(EssCertId {
                cert_hash: OctetString::take_from(cons)?,
                issuer_serial: IssuerSerial::take_opt_from(cons)?,
            })
        })
    }
}

/// One claimed certificate identity from RFC 5035 § 4.
///
/// ```text
/// ESSCertIDv2 ::= SEQUENCE {
///     hashAlgorithm   AlgorithmIdentifier DEFAULT {algorithm id-sha256},
///     certHash        Hash,
///     issuerSerial    IssuerSerial OPTIONAL }
/// ```
#[derive(Clone, Debug)]
pub struct EssCertIdV2 {
    /// Digest algorithm the certificate hash was computed with; `id-sha256`
    /// when the encoding omitted the field.
    pub hash_algorithm: Oid,

    /// Digest of the certificate's DER encoding under `hash_algorithm`.
    pub cert_hash: OctetString,

    /// Issuer and serial number of the claimed certificate.
    pub issuer_serial: Option<IssuerSerial>,
}

impl EssCertIdV2 {
    /// Parse an optional value from the beginning of a constructed value.
    pub fn take_opt_from<S: Source>(
        cons: &mut Constructed<S>,
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        cons.take_opt_sequence(|cons| {
            // The hash algorithm and the certHash are distinguishable by
            // tag: an AlgorithmIdentifier is a SEQUENCE, the hash an OCTET
            // STRING.
            let hash_algorithm = cons
                .take_opt_sequence(|cons| {
                    let algorithm = Oid::take_from(cons)?;

                    // parameters, not interpreted
                    cons.capture_all()?;

                    Ok(algorithm)
                })?
                .unwrap_or_else(|| Oid(Bytes::from_static(OID_SHA256.0)));

            Ok(EssCertIdV2 {
                hash_algorithm,
                cert_hash: OctetString::take_from(cons)?,
                issuer_serial: IssuerSerial::take_opt_from(cons)?,
            })
        })
    }
}

/// Issuer name and certificate serial number, the secondary binding check of
/// an `ESSCertID` / `ESSCertIDv2`.
///
/// ```text
/// IssuerSerial ::= SEQUENCE {
///     issuer          GeneralNames,
///     serialNumber    CertificateSerialNumber }
/// ```
#[derive(Clone, Debug)]
pub struct IssuerSerial {
    /// Names of the claimed certificate's issuer.
    pub issuer: GeneralNames,

    /// Content octets of the serial number INTEGER, compared byte-for-byte
    /// against the certificate's serial number.
    pub serial_number: Bytes,
}

impl IssuerSerial {
    /// Parse an optional value from the beginning of a constructed value.
    pub fn take_opt_from<S: Source>(
        cons: &mut Constructed<S>,
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        cons.take_opt_sequence(|cons| {
            Ok(IssuerSerial {
                issuer: GeneralNames::take_from(cons)?,
                serial_number: cons.take_primitive_if(Tag::INTEGER, |prim| prim.take_all())?,
            })
        })
    }
}

/// The `GeneralNames` of an `IssuerSerial`.
///
/// Only the first name's directoryName choice participates in certificate
/// matching, so that is the only component interpreted here; everything else
/// is captured so that emptiness of the set remains observable.
#[derive(Clone, Debug)]
pub struct GeneralNames {
    first_directory_name: Option<Captured>,
    rest: Captured,
}

impl GeneralNames {
    /// Parse a value from the beginning of a constructed value.
    ///
    /// `directoryName` is the `[4]` choice of `GeneralName` and is
    /// explicitly tagged because `Name` is itself a CHOICE.
    pub fn take_from<S: Source>(
        cons: &mut Constructed<S>,
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            let first_directory_name =
                cons.take_opt_constructed_if(Tag::CTX_4, |cons| cons.capture_all())?;
            let rest = cons.capture_all()?;

            Ok(GeneralNames {
                first_directory_name,
                rest,
            })
        })
    }

    /// Return `true` if the name set held no entries at all.
    pub fn is_empty(&self) -> bool {
        self.first_directory_name.is_none() && self.rest.as_slice().is_empty()
    }

    /// Return the DER-encoded `Name` of the first general name, if the first
    /// general name is a directoryName.
    pub fn first_directory_name(&self) -> Option<&[u8]> {
        self.first_directory_name.as_ref().map(Captured::as_slice)
    }
}
