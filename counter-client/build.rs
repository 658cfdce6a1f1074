// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

fn main() {
    cfg_aliases::cfg_aliases! {
        with_metrics: { feature = "metrics" },
        with_testing: { any(test, feature = "test") },
    };
}
