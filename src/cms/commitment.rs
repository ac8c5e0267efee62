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

use bcder::{
    decode::{Constructed, DecodeError},
    ConstOid, Mode, Oid,
};
use bytes::Bytes;

use crate::cms::{
    signing_certificate::ErrorContext, SignatureError, SignerInfo,
};

/// id-aa-ets-commitmentType from RFC 5126 § 5.11.1.
///
/// 1.2.840.113549.1.9.16.2.16
pub(crate) const OID_COMMITMENT_TYPE_INDICATION: ConstOid =
    Oid(&[42, 134, 72, 134, 247, 13, 1, 9, 16, 2, 16]);

/// id-cti-ets-proofOfOrigin; asserts an author signature.
///
/// 1.2.840.113549.1.9.16.6.1
pub(crate) const OID_PROOF_OF_ORIGIN: ConstOid =
    Oid(&[42, 134, 72, 134, 247, 13, 1, 9, 16, 6, 1]);

/// id-cti-ets-proofOfReceipt; asserts a repository signature.
///
/// 1.2.840.113549.1.9.16.6.2
pub(crate) const OID_PROOF_OF_RECEIPT: ConstOid =
    Oid(&[42, 134, 72, 134, 247, 13, 1, 9, 16, 6, 2]);

const MALFORMED_COMMITMENT_TYPE: &str = "invalid commitment-type-indication attribute";
const CONFLICTING_COMMITMENT_TYPES: &str =
    "the signature asserts conflicting commitment types";

/// The semantic intent a signature asserts through its
/// commitment-type-indication attribute.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CommitmentType {
    /// The signature was made by the package author (proofOfOrigin).
    Author,

    /// The signature was made by a package repository (proofOfReceipt).
    Repository,

    /// No commitment type, or only commitment types with no meaning here.
    Unspecified,
}

impl CommitmentType {
    /// Return `true` for the commitment types that demand the strict
    /// signing-certificate binding rules.
    pub fn is_author_or_repository(self) -> bool {
        matches!(self, CommitmentType::Author | CommitmentType::Repository)
    }
}

/// Classify a signer by its commitment-type-indication attributes.
///
/// Unknown commitment types are ignored. Asserting both author and
/// repository intent is a contradiction and fails validation.
pub(crate) fn classify_commitment_type(
    signer: &SignerInfo,
    errors: &ErrorContext,
) -> Result<CommitmentType, SignatureError> {
    let mut author = false;
    let mut repository = false;

    for attr in &signer.signed_attributes {
        if attr.typ != OID_COMMITMENT_TYPE_INDICATION {
            continue;
        }

        for value in &attr.values {
            let oid = commitment_type_id(value.clone())
                .map_err(|_| errors.invalid(MALFORMED_COMMITMENT_TYPE))?;

            if oid == OID_PROOF_OF_ORIGIN {
                author = true;
            } else if oid == OID_PROOF_OF_RECEIPT {
                repository = true;
            }
        }
    }

    match (author, repository) {
        (true, true) => Err(errors.invalid(CONFLICTING_COMMITMENT_TYPES)),
        (true, false) => Ok(CommitmentType::Author),
        (false, true) => Ok(CommitmentType::Repository),
        (false, false) => Ok(CommitmentType::Unspecified),
    }
}

/// Decode the commitmentTypeId of a CommitmentTypeIndication value.
///
/// ```text
/// CommitmentTypeIndication ::= SEQUENCE {
///     commitmentTypeId            CommitmentTypeIdentifier,
///     commitmentTypeQualifier     SEQUENCE SIZE (1..MAX) OF
///                                     CommitmentTypeQualifier OPTIONAL }
/// ```
fn commitment_type_id(value: Bytes) -> Result<Oid, DecodeError<std::convert::Infallible>> {
    Constructed::decode(value, Mode::Der, |cons| {
        cons.take_sequence(|cons| {
            let oid = Oid::take_from(cons)?;

            // qualifiers, not interpreted
            cons.capture_all()?;

            Ok(oid)
        })
    })
}
