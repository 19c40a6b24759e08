// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#[derive(Debug, Default, Clone)]
pub struct VerifyOptions {
    /// Treat an envelope with zero signers as a configuration error.
    ///
    /// By default an envelope without signers verifies as `true` (AND over an
    /// empty set).
    pub reject_empty_signatures: bool,
}
