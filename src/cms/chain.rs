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

use crate::cms::CertificateDer;

/// Builds a certificate chain for a signing certificate.
///
/// Implementations must not perform revocation checking; whether the chain
/// is ultimately trusted is decided elsewhere. Validation only needs the
/// ordered path.
pub trait ChainBuilder {
    /// Build the chain for `leaf`, consulting `extra_certificates` (an
    /// unordered, untrusted collection) to complete the path.
    ///
    /// Returns the chain leaf-first, ending at a terminating certificate, or
    /// `None` when only a partial chain could be built.
    fn build_chain(
        &self,
        leaf: &CertificateDer,
        extra_certificates: &[CertificateDer],
    ) -> Option<Vec<CertificateDer>>;
}

/// A [`ChainBuilder`] that completes a path by issuer/subject name chaining
/// over the supplied certificates, terminating at a self-signed certificate.
///
/// No signature, validity-period, or key-usage checks are made; the extra
/// certificates are consulted only for path completion.
#[derive(Clone, Copy, Debug, Default)]
pub struct UntrustedChainBuilder;

impl ChainBuilder for UntrustedChainBuilder {
    fn build_chain(
        &self,
        leaf: &CertificateDer,
        extra_certificates: &[CertificateDer],
    ) -> Option<Vec<CertificateDer>> {
        let mut chain: Vec<CertificateDer> = Vec::with_capacity(extra_certificates.len() + 1);
        let mut current = leaf.clone();

        loop {
            let next = {
                let cert = current.parse()?;
                if cert.issuer().as_raw() == cert.subject().as_raw() {
                    None
                } else {
                    let issuer_raw = cert.issuer().as_raw();
                    let mut found = None;

                    for candidate in extra_certificates {
                        // A certificate already on the path cannot be its
                        // own ancestor.
                        if *candidate == current || chain.contains(candidate) {
                            continue;
                        }

                        let Some(candidate_cert) = candidate.parse() else {
                            continue;
                        };

                        if candidate_cert.subject().as_raw() == issuer_raw {
                            found = Some(candidate.clone());
                            break;
                        }
                    }

                    match found {
                        Some(issuer) => Some(issuer),
                        // A non-self-signed certificate with no issuer
                        // available means the path cannot be completed.
                        None => return None,
                    }
                }
            };

            match next {
                Some(next) => {
                    chain.push(current);
                    current = next;
                }
                None => {
                    chain.push(current);
                    return Some(chain);
                }
            }
        }
    }
}
