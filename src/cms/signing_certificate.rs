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

use x509_certificate::DigestAlgorithm;
use x509_parser::prelude::{FromDer, X509Name};

use crate::{
    asn1::rfc5035::{
        EssCertIdV2, IssuerSerial, SigningCertificate, SigningCertificateV2,
        OID_SIGNING_CERTIFICATE, OID_SIGNING_CERTIFICATE_V2,
    },
    cms::{
        commitment::classify_commitment_type, CertificateDer, ChainBuilder, Signature,
        SignatureError, SignerInfo,
    },
    hash,
    validation_codes::{
        SIGNING_CREDENTIAL_CHAIN_INCOMPLETE, SIGNING_CREDENTIAL_INVALID,
        SIGNING_CREDENTIAL_MISSING, TIMESTAMP_CREDENTIAL_CHAIN_INCOMPLETE,
        TIMESTAMP_CREDENTIAL_INVALID, TIMESTAMP_CREDENTIAL_MISSING,
    },
};

const MULTIPLE_V1_ATTRIBUTES: &str = "multiple signing-certificate attributes are not allowed";
const MULTIPLE_V2_ATTRIBUTES: &str = "multiple signing-certificate-v2 attributes are not allowed";
const V1_VALUE_COUNT: &str =
    "the signing-certificate attribute must contain exactly one attribute value";
const V2_VALUE_COUNT: &str =
    "the signing-certificate-v2 attribute must contain exactly one attribute value";
const MALFORMED_V1: &str = "invalid signing-certificate attribute";
const MALFORMED_V2: &str = "invalid signing-certificate-v2 attribute";
const V1_MUST_NOT_BE_PRESENT: &str =
    "the signing-certificate attribute must not be present for author or repository signatures";
const V2_MUST_BE_PRESENT: &str =
    "the signing-certificate-v2 attribute must be present for author or repository signatures";
const V1_CERTIFICATE_NOT_FOUND: &str =
    "the signing-certificate attribute does not match the signing certificate";
const V2_UNSUPPORTED_HASH_ALGORITHM: &str =
    "the signing-certificate-v2 attribute uses an unsupported hash algorithm";
const V2_CERTIFICATE_NOT_FOUND: &str =
    "the signing-certificate-v2 attribute does not match the signing certificate";
const V2_CHAIN_CERTIFICATE_NOT_FOUND: &str =
    "the signing-certificate-v2 attribute does not match a certificate in the chain";
const ISSUER_SERIAL_REQUIRED: &str = "the signing-certificate-v2 attribute must carry an issuer and serial number for author or repository signatures";
const MALFORMED_ISSUER_NAME: &str = "invalid issuer name in a claimed issuer serial";
const INVALID_CHAIN_CERTIFICATE: &str = "invalid certificate in the certificate chain";

/// The diagnostic codes and messages reported for one calling context.
///
/// Identical failure conditions must surface distinct diagnostics for a
/// primary signature and for a time stamp countersignature, so the shared
/// validation routine is parameterized by one of these bundles instead of
/// branching on the caller.
pub(crate) struct ErrorContext {
    no_certificate_code: &'static str,
    no_certificate_message: &'static str,
    invalid_signature_code: &'static str,
    invalid_signature_message: &'static str,
    chain_building_failed_code: &'static str,
}

const PRIMARY_ERRORS: ErrorContext = ErrorContext {
    no_certificate_code: SIGNING_CREDENTIAL_MISSING,
    no_certificate_message: "the signature does not contain a signing certificate",
    invalid_signature_code: SIGNING_CREDENTIAL_INVALID,
    invalid_signature_message: "the signature is invalid",
    chain_building_failed_code: SIGNING_CREDENTIAL_CHAIN_INCOMPLETE,
};

const TIMESTAMP_ERRORS: ErrorContext = ErrorContext {
    no_certificate_code: TIMESTAMP_CREDENTIAL_MISSING,
    no_certificate_message: "the time stamp does not contain a signing certificate",
    invalid_signature_code: TIMESTAMP_CREDENTIAL_INVALID,
    invalid_signature_message: "the time stamp signature is invalid",
    chain_building_failed_code: TIMESTAMP_CREDENTIAL_CHAIN_INCOMPLETE,
};

impl ErrorContext {
    fn no_certificate(&self) -> SignatureError {
        SignatureError::NoCertificate {
            code: self.no_certificate_code,
            message: self.no_certificate_message,
        }
    }

    pub(crate) fn invalid(&self, reason: &str) -> SignatureError {
        SignatureError::InvalidSignature {
            code: self.invalid_signature_code,
            reason: reason.to_string(),
        }
    }

    fn invalid_generic(&self) -> SignatureError {
        self.invalid(self.invalid_signature_message)
    }

    fn chain_building_failed(&self) -> SignatureError {
        SignatureError::ChainBuildingFailed {
            code: self.chain_building_failed_code,
        }
    }
}

/// The set of digest algorithms a signing-certificate-v2 attribute is
/// permitted to use.
///
/// Defaults to SHA-256, SHA-384, and SHA-512.
#[derive(Clone, Debug)]
pub struct AllowedHashAlgorithms(Vec<DigestAlgorithm>);

impl Default for AllowedHashAlgorithms {
    fn default() -> Self {
        Self(vec![
            DigestAlgorithm::Sha256,
            DigestAlgorithm::Sha384,
            DigestAlgorithm::Sha512,
        ])
    }
}

impl AllowedHashAlgorithms {
    /// Build an allow-list from an explicit set of algorithms.
    pub fn new(algorithms: Vec<DigestAlgorithm>) -> Self {
        Self(algorithms)
    }

    fn contains(&self, algorithm: DigestAlgorithm) -> bool {
        self.0.contains(&algorithm)
    }
}

/// Resolve and validate the signing certificates of a signature's primary
/// signer.
///
/// Builds the certificate chain for the signer's end-entity certificate and
/// verifies that every certificate in it is consistent with what the
/// signing-certificate / signing-certificate-v2 signed attributes claim.
/// Returns the chain leaf-first. Fails — with primary-signature diagnostic
/// codes — rather than returning any partial result.
pub fn primary_signing_certificates(
    signature: &Signature,
    chain_builder: &impl ChainBuilder,
    allowed_hash_algorithms: &AllowedHashAlgorithms,
) -> Result<Vec<CertificateDer>, SignatureError> {
    signing_certificates(
        &signature.signer_info,
        &signature.certificates,
        chain_builder,
        allowed_hash_algorithms,
        &PRIMARY_ERRORS,
    )
}

/// Resolve and validate the signing certificates of a signature's first time
/// stamp countersignature.
///
/// Identical to [`primary_signing_certificates`] except that the time
/// stamp's signer is validated and failures carry time-stamp diagnostic
/// codes. Fails with [`SignatureError::TimestampMissing`] when the signature
/// has no time stamp.
pub fn timestamp_signing_certificates(
    signature: &Signature,
    chain_builder: &impl ChainBuilder,
    allowed_hash_algorithms: &AllowedHashAlgorithms,
) -> Result<Vec<CertificateDer>, SignatureError> {
    let Some(timestamp) = signature.timestamps.first() else {
        return Err(SignatureError::TimestampMissing);
    };

    signing_certificates(
        &timestamp.signer_info,
        &timestamp.certificates,
        chain_builder,
        allowed_hash_algorithms,
        &TIMESTAMP_ERRORS,
    )
}

/// The signing-certificate claim a signer makes through its attributes.
enum Claim {
    None,
    V1(SigningCertificate),
    V2(SigningCertificateV2),
}

fn signing_certificates(
    signer: &SignerInfo,
    extra_certificates: &[CertificateDer],
    chain_builder: &impl ChainBuilder,
    allowed: &AllowedHashAlgorithms,
    errors: &ErrorContext,
) -> Result<Vec<CertificateDer>, SignatureError> {
    let leaf = signer
        .certificate
        .as_ref()
        .ok_or_else(|| errors.no_certificate())?;

    let (v1, v2) = extract_attributes(signer, errors)?;

    let commitment = classify_commitment_type(signer, errors)?;
    let issuer_serial_required = commitment.is_author_or_repository();

    if issuer_serial_required {
        if v2.is_none() {
            return Err(errors.invalid(V2_MUST_BE_PRESENT));
        }
        if v1.is_some() {
            return Err(errors.invalid(V1_MUST_NOT_BE_PRESENT));
        }
    }

    // v1 is only consulted when no v2 attribute exists.
    let claim = match (v1, v2) {
        (_, Some(v2)) => Claim::V2(v2),
        (Some(v1), None) => Claim::V1(v1),
        (None, None) => Claim::None,
    };

    let chain = chain_builder
        .build_chain(leaf, extra_certificates)
        .filter(|chain| !chain.is_empty())
        .ok_or_else(|| errors.chain_building_failed())?;

    match claim {
        Claim::V2(claim) => match_v2(&chain, &claim, allowed, issuer_serial_required, errors),
        Claim::V1(claim) => match_v1(&chain, &claim, errors),
        Claim::None => Ok(chain),
    }
}

/// Scan the signed attributes once, returning the at-most-one
/// signing-certificate and signing-certificate-v2 attribute values.
fn extract_attributes(
    signer: &SignerInfo,
    errors: &ErrorContext,
) -> Result<(Option<SigningCertificate>, Option<SigningCertificateV2>), SignatureError> {
    let mut v1 = None;
    let mut v2 = None;

    for attr in &signer.signed_attributes {
        if attr.typ == OID_SIGNING_CERTIFICATE {
            if v1.is_some() {
                return Err(errors.invalid(MULTIPLE_V1_ATTRIBUTES));
            }
            let [value] = attr.values.as_slice() else {
                return Err(errors.invalid(V1_VALUE_COUNT));
            };
            v1 = Some(
                SigningCertificate::parse(value.clone())
                    .map_err(|_| errors.invalid(MALFORMED_V1))?,
            );
        } else if attr.typ == OID_SIGNING_CERTIFICATE_V2 {
            if v2.is_some() {
                return Err(errors.invalid(MULTIPLE_V2_ATTRIBUTES));
            }
            let [value] = attr.values.as_slice() else {
                return Err(errors.invalid(V2_VALUE_COUNT));
            };
            v2 = Some(
                SigningCertificateV2::parse(value.clone())
                    .map_err(|_| errors.invalid(MALFORMED_V2))?,
            );
        }
    }

    Ok((v1, v2))
}

fn match_v1(
    chain: &[CertificateDer],
    claim: &SigningCertificate,
    errors: &ErrorContext,
) -> Result<Vec<CertificateDer>, SignatureError> {
    // Only the first ESSCertID binds; the rest of the chain is accepted on
    // the strength of chain building alone.
    let Some(ess) = claim.certs.first() else {
        return Err(errors.invalid(MALFORMED_V1));
    };
    let Some(leaf) = chain.first() else {
        return Err(errors.chain_building_failed());
    };

    let mut matched =
        ess.cert_hash.to_bytes().as_ref() == hash::sha1(leaf.as_bytes()).as_slice();

    if matched {
        if let Some(issuer_serial) = &ess.issuer_serial {
            matched = issuer_serial_matches(leaf, issuer_serial, errors)?;
        }
    }

    if !matched {
        return Err(errors.invalid(V1_CERTIFICATE_NOT_FOUND));
    }

    Ok(chain.to_vec())
}

fn match_v2(
    chain: &[CertificateDer],
    claim: &SigningCertificateV2,
    allowed: &AllowedHashAlgorithms,
    issuer_serial_required: bool,
    errors: &ErrorContext,
) -> Result<Vec<CertificateDer>, SignatureError> {
    // Every record's hash algorithm must be acceptable before any matching
    // begins, including records that would never be consulted.
    let mut algorithms = Vec::with_capacity(claim.certs.len());

    for record in &claim.certs {
        let algorithm = DigestAlgorithm::try_from(&record.hash_algorithm)
            .map_err(|_| errors.invalid(V2_UNSUPPORTED_HASH_ALGORITHM))?;
        if !allowed.contains(algorithm) {
            return Err(errors.invalid(V2_UNSUPPORTED_HASH_ALGORITHM));
        }
        algorithms.push(algorithm);
    }

    let (Some(first_record), Some(first_algorithm)) =
        (claim.certs.first(), algorithms.first().copied())
    else {
        return Err(errors.invalid(MALFORMED_V2));
    };
    let Some(leaf) = chain.first() else {
        return Err(errors.chain_building_failed());
    };

    let mut accepted = Vec::with_capacity(chain.len());

    {
        let mut digests = CertificateDigests::new(leaf);
        if !matches_record(
            &mut digests,
            leaf,
            first_record,
            first_algorithm,
            issuer_serial_required,
            errors,
        )? {
            return Err(errors.invalid(V2_CERTIFICATE_NOT_FOUND));
        }
    }
    accepted.push(leaf.clone());

    for cert in &chain[1..] {
        // A lone record only binds the leaf; the rest of the chain is
        // accepted on the strength of chain building alone.
        if claim.certs.len() == 1 {
            accepted.push(cert.clone());
            continue;
        }

        let mut digests = CertificateDigests::new(cert);
        let mut matched = false;

        for (record, algorithm) in claim.certs.iter().zip(algorithms.iter().copied()).skip(1) {
            if matches_record(
                &mut digests,
                cert,
                record,
                algorithm,
                issuer_serial_required,
                errors,
            )? {
                // A certificate matching several records is still accepted
                // exactly once.
                matched = true;
                break;
            }
        }

        if !matched {
            return Err(errors.invalid(V2_CHAIN_CERTIFICATE_NOT_FOUND));
        }
        accepted.push(cert.clone());
    }

    // Every chain certificate was either accepted above or the function has
    // already failed; anything else is an implementation error.
    if accepted.len() != chain.len() {
        return Err(errors.invalid_generic());
    }

    Ok(accepted)
}

/// Match one certificate against one `ESSCertIDv2` record.
///
/// A mandatory issuer serial that is absent or carries no names is a
/// malformed claim and fails hard; serial, name, and digest inequalities are
/// honest mismatches and report "no match".
fn matches_record(
    digests: &mut CertificateDigests<'_>,
    cert: &CertificateDer,
    record: &EssCertIdV2,
    algorithm: DigestAlgorithm,
    issuer_serial_required: bool,
    errors: &ErrorContext,
) -> Result<bool, SignatureError> {
    if issuer_serial_required {
        match &record.issuer_serial {
            Some(issuer_serial) if !issuer_serial.issuer.is_empty() => {}
            _ => return Err(errors.invalid(ISSUER_SERIAL_REQUIRED)),
        }
    }

    if let Some(issuer_serial) = &record.issuer_serial {
        if !issuer_serial_matches(cert, issuer_serial, errors)? {
            return Ok(false);
        }
    }

    Ok(digests.matches(algorithm, record.cert_hash.to_bytes().as_ref()))
}

/// Compare a claimed `IssuerSerial` against a certificate: serial numbers
/// byte-for-byte, and the first general name's directoryName (when present)
/// against the certificate's issuer name as an exact string.
fn issuer_serial_matches(
    cert_der: &CertificateDer,
    claim: &IssuerSerial,
    errors: &ErrorContext,
) -> Result<bool, SignatureError> {
    let Some(cert) = cert_der.parse() else {
        return Err(errors.invalid(INVALID_CHAIN_CERTIFICATE));
    };

    if claim.serial_number.as_ref() != cert.raw_serial() {
        return Ok(false);
    }

    if let Some(name_der) = claim.issuer.first_directory_name() {
        let (_, claimed) =
            X509Name::from_der(name_der).map_err(|_| errors.invalid(MALFORMED_ISSUER_NAME))?;

        if claimed.to_string() != cert.issuer().to_string() {
            return Ok(false);
        }
    }

    Ok(true)
}

/// Digests of one certificate's DER encoding, each computed at most once.
///
/// Scoped to a single certificate within a single validation call; nothing
/// is shared or carried across calls.
struct CertificateDigests<'a> {
    der: &'a [u8],
    digests: Vec<(DigestAlgorithm, Vec<u8>)>,
}

impl<'a> CertificateDigests<'a> {
    fn new(cert: &'a CertificateDer) -> Self {
        Self {
            der: cert.as_bytes(),
            digests: Vec::new(),
        }
    }

    /// Compare the certificate's digest under `algorithm` to a claimed hash,
    /// computing the digest only on first use of the algorithm.
    fn matches(&mut self, algorithm: DigestAlgorithm, claimed: &[u8]) -> bool {
        if !self.digests.iter().any(|(a, _)| *a == algorithm) {
            let mut context = algorithm.digester();
            context.update(self.der);
            self.digests
                .push((algorithm, context.finish().as_ref().to_vec()));
        }

        self.digests
            .iter()
            .any(|(a, digest)| *a == algorithm && digest.as_slice() == claimed)
    }
}
