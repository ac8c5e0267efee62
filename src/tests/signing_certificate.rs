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

use crate::{
    asn1::rfc5035::{OID_SIGNING_CERTIFICATE, OID_SIGNING_CERTIFICATE_V2},
    cms::{
        primary_signing_certificates, timestamp_signing_certificates, AllowedHashAlgorithms,
        CertificateDer, SignatureError, SignedAttribute, SignerInfo, UntrustedChainBuilder,
    },
    hash::sha1,
    tests::test_utils::{
        attribute, commitment_type_value, der, ess_cert_id, ess_cert_id_v2, intermediate,
        issuer_name_der, issuer_serial_for, issuer_serial_value, leaf, raw_serial, root, sha256,
        sha384, signature, signer, signing_certificate_value, INTERMEDIATE_DER, LEAF_DER,
        OID_COMMITMENT_TYPE_DER, OID_PROOF_OF_ORIGIN_DER, OID_SHA1_DER, OID_SHA384_DER, ROOT_DER,
    },
    validation_codes::{
        SIGNING_CREDENTIAL_CHAIN_INCOMPLETE, SIGNING_CREDENTIAL_INVALID,
        SIGNING_CREDENTIAL_MISSING, TIMESTAMP_CREDENTIAL_CHAIN_INCOMPLETE,
        TIMESTAMP_CREDENTIAL_MISSING,
    },
};

fn validate(signer_info: SignerInfo) -> Result<Vec<CertificateDer>, SignatureError> {
    primary_signing_certificates(
        &signature(signer_info, vec![intermediate(), root()]),
        &UntrustedChainBuilder,
        &AllowedHashAlgorithms::default(),
    )
}

fn v1_attribute(ids: &[Vec<u8>]) -> SignedAttribute {
    attribute(
        OID_SIGNING_CERTIFICATE.0,
        vec![signing_certificate_value(ids)],
    )
}

fn v2_attribute(ids: &[Vec<u8>]) -> SignedAttribute {
    attribute(
        OID_SIGNING_CERTIFICATE_V2.0,
        vec![signing_certificate_value(ids)],
    )
}

fn full_chain() -> Vec<CertificateDer> {
    vec![leaf(), intermediate(), root()]
}

fn assert_invalid(result: Result<Vec<CertificateDer>, SignatureError>, needle: &str) {
    match result {
        Err(SignatureError::InvalidSignature { code, reason }) => {
            assert_eq!(code, SIGNING_CREDENTIAL_INVALID);
            assert!(reason.contains(needle), "unexpected reason: {reason}");
        }
        other => panic!("expected InvalidSignature, got {other:?}"),
    }
}

// -- entry points --

#[test]
fn missing_certificate_fails_with_primary_code() {
    assert_eq!(
        validate(signer(None, vec![])),
        Err(SignatureError::NoCertificate {
            code: SIGNING_CREDENTIAL_MISSING,
            message: "the signature does not contain a signing certificate",
        })
    );
}

#[test]
fn missing_certificate_fails_with_timestamp_code() {
    let mut sig = signature(signer(Some(leaf()), vec![]), vec![intermediate(), root()]);
    sig.timestamps = vec![signature(signer(None, vec![]), vec![])];

    match timestamp_signing_certificates(
        &sig,
        &UntrustedChainBuilder,
        &AllowedHashAlgorithms::default(),
    ) {
        Err(SignatureError::NoCertificate { code, .. }) => {
            assert_eq!(code, TIMESTAMP_CREDENTIAL_MISSING);
        }
        other => panic!("expected NoCertificate, got {other:?}"),
    }
}

#[test]
fn signature_without_timestamp_is_reported() {
    let sig = signature(signer(Some(leaf()), vec![]), vec![intermediate(), root()]);

    assert_eq!(
        timestamp_signing_certificates(
            &sig,
            &UntrustedChainBuilder,
            &AllowedHashAlgorithms::default(),
        ),
        Err(SignatureError::TimestampMissing)
    );
}

#[test]
fn timestamp_chain_is_resolved() {
    let mut sig = signature(signer(None, vec![]), vec![]);
    sig.timestamps = vec![signature(
        signer(Some(leaf()), vec![]),
        vec![intermediate(), root()],
    )];

    let chain = timestamp_signing_certificates(
        &sig,
        &UntrustedChainBuilder,
        &AllowedHashAlgorithms::default(),
    )
    .unwrap();

    assert_eq!(chain, full_chain());
}

#[test]
fn no_binding_attributes_returns_the_chain() {
    assert_eq!(validate(signer(Some(leaf()), vec![])).unwrap(), full_chain());
}

#[test]
fn partial_chain_fails_with_primary_code() {
    let result = primary_signing_certificates(
        &signature(signer(Some(leaf()), vec![]), vec![root()]),
        &UntrustedChainBuilder,
        &AllowedHashAlgorithms::default(),
    );

    assert_eq!(
        result,
        Err(SignatureError::ChainBuildingFailed {
            code: SIGNING_CREDENTIAL_CHAIN_INCOMPLETE,
        })
    );
}

#[test]
fn partial_chain_fails_with_timestamp_code() {
    let mut sig = signature(signer(None, vec![]), vec![]);
    sig.timestamps = vec![signature(signer(Some(leaf()), vec![]), vec![])];

    assert_eq!(
        timestamp_signing_certificates(
            &sig,
            &UntrustedChainBuilder,
            &AllowedHashAlgorithms::default(),
        ),
        Err(SignatureError::ChainBuildingFailed {
            code: TIMESTAMP_CREDENTIAL_CHAIN_INCOMPLETE,
        })
    );
}

// -- attribute extraction --

#[test]
fn duplicate_v1_attributes_are_rejected() {
    let id = ess_cert_id(&sha1(LEAF_DER), None);
    let attrs = vec![v1_attribute(&[id.clone()]), v1_attribute(&[id])];

    assert_invalid(validate(signer(Some(leaf()), attrs)), "multiple");
}

#[test]
fn duplicate_v2_attributes_are_rejected() {
    let id = ess_cert_id_v2(None, &sha256(LEAF_DER), None);
    let attrs = vec![v2_attribute(&[id.clone()]), v2_attribute(&[id])];

    assert_invalid(validate(signer(Some(leaf()), attrs)), "multiple");
}

#[test]
fn multi_valued_attribute_is_rejected() {
    let value = signing_certificate_value(&[ess_cert_id(&sha1(LEAF_DER), None)]);
    let attr = attribute(OID_SIGNING_CERTIFICATE.0, vec![value.clone(), value]);

    assert_invalid(validate(signer(Some(leaf()), vec![attr])), "exactly one");
}

#[test]
fn empty_valued_attribute_is_rejected() {
    let attr = attribute(OID_SIGNING_CERTIFICATE_V2.0, vec![]);

    assert_invalid(validate(signer(Some(leaf()), vec![attr])), "exactly one");
}

#[test]
fn malformed_attribute_value_is_rejected() {
    let attr = attribute(OID_SIGNING_CERTIFICATE.0, vec![vec![0x04, 0x01, 0xff]]);

    assert_invalid(
        validate(signer(Some(leaf()), vec![attr])),
        "invalid signing-certificate",
    );
}

// -- v1 matching --

#[test]
fn v1_matching_hash_returns_the_chain() {
    let attrs = vec![v1_attribute(&[ess_cert_id(&sha1(LEAF_DER), None)])];

    assert_eq!(validate(signer(Some(leaf()), attrs)).unwrap(), full_chain());
}

#[test]
fn v1_hash_mismatch_is_rejected() {
    let attrs = vec![v1_attribute(&[ess_cert_id(&sha1(ROOT_DER), None)])];

    assert_invalid(
        validate(signer(Some(leaf()), attrs)),
        "does not match the signing certificate",
    );
}

#[test]
fn v1_issuer_serial_match_returns_the_chain() {
    let attrs = vec![v1_attribute(&[ess_cert_id(
        &sha1(LEAF_DER),
        Some(issuer_serial_for(&leaf())),
    )])];

    assert_eq!(validate(signer(Some(leaf()), attrs)).unwrap(), full_chain());
}

#[test]
fn v1_serial_mismatch_is_rejected() {
    let mut wrong_serial = raw_serial(&leaf());
    wrong_serial[0] ^= 0xff;
    let issuer_serial = issuer_serial_value(&der(0xa4, &issuer_name_der(&leaf())), &wrong_serial);

    let attrs = vec![v1_attribute(&[ess_cert_id(&sha1(LEAF_DER), Some(issuer_serial))])];

    assert_invalid(
        validate(signer(Some(leaf()), attrs)),
        "does not match the signing certificate",
    );
}

#[test]
fn v1_issuer_name_mismatch_is_rejected() {
    // Root's issuer name, not the leaf's.
    let issuer_serial =
        issuer_serial_value(&der(0xa4, &issuer_name_der(&root())), &raw_serial(&leaf()));

    let attrs = vec![v1_attribute(&[ess_cert_id(&sha1(LEAF_DER), Some(issuer_serial))])];

    assert_invalid(
        validate(signer(Some(leaf()), attrs)),
        "does not match the signing certificate",
    );
}

#[test]
fn v1_non_directory_first_name_skips_the_name_check() {
    let names = der(0x81, b"signer@example.test");
    let issuer_serial = issuer_serial_value(&names, &raw_serial(&leaf()));

    let attrs = vec![v1_attribute(&[ess_cert_id(&sha1(LEAF_DER), Some(issuer_serial))])];

    assert_eq!(validate(signer(Some(leaf()), attrs)).unwrap(), full_chain());
}

// -- v2 matching --

#[test]
fn v2_single_record_binds_only_the_leaf() {
    let attrs = vec![v2_attribute(&[ess_cert_id_v2(None, &sha256(LEAF_DER), None)])];

    assert_eq!(validate(signer(Some(leaf()), attrs)).unwrap(), full_chain());
}

#[test]
fn v2_leaf_mismatch_is_rejected() {
    let attrs = vec![v2_attribute(&[ess_cert_id_v2(
        None,
        &sha256(INTERMEDIATE_DER),
        None,
    )])];

    assert_invalid(
        validate(signer(Some(leaf()), attrs)),
        "does not match the signing certificate",
    );
}

#[test]
fn v2_records_cover_the_whole_chain() {
    // Record order past the first is irrelevant.
    let attrs = vec![v2_attribute(&[
        ess_cert_id_v2(None, &sha256(LEAF_DER), None),
        ess_cert_id_v2(None, &sha256(ROOT_DER), None),
        ess_cert_id_v2(None, &sha256(INTERMEDIATE_DER), None),
    ])];

    assert_eq!(validate(signer(Some(leaf()), attrs)).unwrap(), full_chain());
}

#[test]
fn v2_two_records_bind_a_two_certificate_chain() {
    // Intermediate as the signing certificate gives a two-certificate path.
    let attrs = vec![v2_attribute(&[
        ess_cert_id_v2(None, &sha256(INTERMEDIATE_DER), None),
        ess_cert_id_v2(Some(OID_SHA384_DER), &sha384(ROOT_DER), None),
    ])];

    let chain = primary_signing_certificates(
        &signature(signer(Some(intermediate()), attrs), vec![root()]),
        &UntrustedChainBuilder,
        &AllowedHashAlgorithms::default(),
    )
    .unwrap();

    assert_eq!(chain, vec![intermediate(), root()]);
}

#[test]
fn v2_unmatched_chain_certificate_is_rejected() {
    // No record accounts for the root.
    let attrs = vec![v2_attribute(&[
        ess_cert_id_v2(None, &sha256(LEAF_DER), None),
        ess_cert_id_v2(None, &sha256(INTERMEDIATE_DER), None),
    ])];

    assert_invalid(
        validate(signer(Some(leaf()), attrs)),
        "certificate in the chain",
    );
}

#[test]
fn v2_extra_unmatched_records_are_tolerated() {
    let attrs = vec![v2_attribute(&[
        ess_cert_id_v2(None, &sha256(LEAF_DER), None),
        ess_cert_id_v2(None, &sha256(INTERMEDIATE_DER), None),
        ess_cert_id_v2(None, &sha256(ROOT_DER), None),
        ess_cert_id_v2(None, &[0x5a; 32], None),
    ])];

    assert_eq!(validate(signer(Some(leaf()), attrs)).unwrap(), full_chain());
}

#[test]
fn v2_sha384_records_are_matched() {
    let attrs = vec![v2_attribute(&[ess_cert_id_v2(
        Some(OID_SHA384_DER),
        &sha384(LEAF_DER),
        None,
    )])];

    assert_eq!(validate(signer(Some(leaf()), attrs)).unwrap(), full_chain());
}

#[test]
fn v2_sha1_records_are_rejected() {
    let attrs = vec![v2_attribute(&[ess_cert_id_v2(
        Some(OID_SHA1_DER),
        &sha1(LEAF_DER),
        None,
    )])];

    assert_invalid(
        validate(signer(Some(leaf()), attrs)),
        "unsupported hash algorithm",
    );
}

#[test]
fn v2_unknown_algorithm_is_rejected() {
    let attrs = vec![v2_attribute(&[ess_cert_id_v2(
        Some(OID_COMMITMENT_TYPE_DER),
        &sha256(LEAF_DER),
        None,
    )])];

    assert_invalid(
        validate(signer(Some(leaf()), attrs)),
        "unsupported hash algorithm",
    );
}

#[test]
fn v2_algorithms_are_checked_before_any_matching() {
    // The first record matches the leaf, but the second record's algorithm
    // already disqualifies the attribute.
    let attrs = vec![v2_attribute(&[
        ess_cert_id_v2(None, &sha256(LEAF_DER), None),
        ess_cert_id_v2(Some(OID_SHA1_DER), &sha1(INTERMEDIATE_DER), None),
    ])];

    assert_invalid(
        validate(signer(Some(leaf()), attrs)),
        "unsupported hash algorithm",
    );
}

#[test]
fn v2_custom_allowed_algorithms_are_honored() {
    let allowed = AllowedHashAlgorithms::new(vec![DigestAlgorithm::Sha384]);
    let sig = |ids: &[Vec<u8>]| {
        signature(
            signer(Some(leaf()), vec![v2_attribute(ids)]),
            vec![intermediate(), root()],
        )
    };

    let sha384_record = ess_cert_id_v2(Some(OID_SHA384_DER), &sha384(LEAF_DER), None);
    assert_eq!(
        primary_signing_certificates(&sig(&[sha384_record]), &UntrustedChainBuilder, &allowed)
            .unwrap(),
        full_chain()
    );

    let sha256_record = ess_cert_id_v2(None, &sha256(LEAF_DER), None);
    assert_invalid(
        primary_signing_certificates(&sig(&[sha256_record]), &UntrustedChainBuilder, &allowed),
        "unsupported hash algorithm",
    );
}

#[test]
fn v2_takes_precedence_over_v1() {
    // The stale v1 attribute no longer matches; only v2 is consulted.
    let attrs = vec![
        v1_attribute(&[ess_cert_id(&sha1(ROOT_DER), None)]),
        v2_attribute(&[ess_cert_id_v2(None, &sha256(LEAF_DER), None)]),
    ];

    assert_eq!(validate(signer(Some(leaf()), attrs)).unwrap(), full_chain());
}

#[test]
fn mismatched_v2_is_rejected_even_when_v1_matches() {
    let attrs = vec![
        v1_attribute(&[ess_cert_id(&sha1(LEAF_DER), None)]),
        v2_attribute(&[ess_cert_id_v2(None, &sha256(ROOT_DER), None)]),
    ];

    assert_invalid(
        validate(signer(Some(leaf()), attrs)),
        "does not match the signing certificate",
    );
}

// -- mandatory issuer serial --

fn author_attrs(ids: &[Vec<u8>]) -> Vec<SignedAttribute> {
    vec![
        attribute(
            OID_COMMITMENT_TYPE_DER,
            vec![commitment_type_value(OID_PROOF_OF_ORIGIN_DER)],
        ),
        v2_attribute(ids),
    ]
}

#[test]
fn author_record_without_issuer_serial_is_rejected() {
    let attrs = author_attrs(&[ess_cert_id_v2(None, &sha256(LEAF_DER), None)]);

    assert_invalid(
        validate(signer(Some(leaf()), attrs)),
        "issuer and serial number",
    );
}

#[test]
fn author_record_with_empty_issuer_names_is_rejected() {
    let empty_names = issuer_serial_value(&[], &raw_serial(&leaf()));
    let attrs = author_attrs(&[ess_cert_id_v2(None, &sha256(LEAF_DER), Some(empty_names))]);

    assert_invalid(
        validate(signer(Some(leaf()), attrs)),
        "issuer and serial number",
    );
}

#[test]
fn author_chain_with_issuer_serials_is_accepted() {
    let attrs = author_attrs(&[
        ess_cert_id_v2(None, &sha256(LEAF_DER), Some(issuer_serial_for(&leaf()))),
        ess_cert_id_v2(
            None,
            &sha256(INTERMEDIATE_DER),
            Some(issuer_serial_for(&intermediate())),
        ),
        ess_cert_id_v2(None, &sha256(ROOT_DER), Some(issuer_serial_for(&root()))),
    ]);

    assert_eq!(validate(signer(Some(leaf()), attrs)).unwrap(), full_chain());
}

#[test]
fn author_serial_mismatch_is_rejected() {
    let mut wrong_serial = raw_serial(&leaf());
    wrong_serial[0] ^= 0xff;
    let issuer_serial = issuer_serial_value(&der(0xa4, &issuer_name_der(&leaf())), &wrong_serial);

    let attrs = author_attrs(&[ess_cert_id_v2(None, &sha256(LEAF_DER), Some(issuer_serial))]);

    assert_invalid(
        validate(signer(Some(leaf()), attrs)),
        "does not match the signing certificate",
    );
}

// -- repeatability --

#[test]
fn validation_is_repeatable() {
    let build = || {
        signature(
            signer(
                Some(leaf()),
                vec![v2_attribute(&[
                    ess_cert_id_v2(None, &sha256(LEAF_DER), None),
                    ess_cert_id_v2(None, &sha256(INTERMEDIATE_DER), None),
                    ess_cert_id_v2(None, &sha256(ROOT_DER), None),
                ])],
            ),
            vec![intermediate(), root()],
        )
    };

    let first = primary_signing_certificates(
        &build(),
        &UntrustedChainBuilder,
        &AllowedHashAlgorithms::default(),
    );
    let second = primary_signing_certificates(
        &build(),
        &UntrustedChainBuilder,
        &AllowedHashAlgorithms::default(),
    );

    assert_eq!(first, second);
    assert_eq!(first.unwrap(), full_chain());
}

// -- signature helper types --

#[test]
fn certificate_der_preserves_the_exact_encoding() {
    assert_eq!(CertificateDer::new(LEAF_DER).as_bytes(), LEAF_DER);
}
