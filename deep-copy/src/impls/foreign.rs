/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Optional immutable-seed-type integrations, one `impl` block per
//! feature flag, each gating a single optional dependency's worth of code.

#[cfg(feature = "uuid")]
mod uuid_impl {
    use crate::array::{ArrayElement, Block};
    use crate::policy::ImmutableType;
    use crate::{CopyContext, DeepCopy};
    use uuid::Uuid;

    unsafe impl ImmutableType for Uuid {}

    impl DeepCopy for Uuid {
        fn deep_copy(&self, _ctx: &mut CopyContext) -> Self {
            *self
        }
    }

    impl ArrayElement for Uuid {
        type Kind = Block;
    }
}

#[cfg(feature = "decimal")]
mod decimal_impl {
    use crate::array::{ArrayElement, Block};
    use crate::policy::ImmutableType;
    use crate::{CopyContext, DeepCopy};
    use rust_decimal::Decimal;

    unsafe impl ImmutableType for Decimal {}

    impl DeepCopy for Decimal {
        fn deep_copy(&self, _ctx: &mut CopyContext) -> Self {
            *self
        }
    }

    impl ArrayElement for Decimal {
        type Kind = Block;
    }
}

#[cfg(feature = "semver")]
mod semver_impl {
    use crate::array::{ArrayElement, Block};
    use crate::policy::ImmutableType;
    use crate::{CopyContext, DeepCopy};
    use semver::Version;

    unsafe impl ImmutableType for Version {}

    impl DeepCopy for Version {
        fn deep_copy(&self, _ctx: &mut CopyContext) -> Self {
            self.clone()
        }
    }

    impl ArrayElement for Version {
        type Kind = Block;
    }
}

#[cfg(feature = "url")]
mod url_impl {
    use crate::array::{ArrayElement, Block};
    use crate::policy::ImmutableType;
    use crate::{CopyContext, DeepCopy};
    use url::Url;

    unsafe impl ImmutableType for Url {}

    impl DeepCopy for Url {
        fn deep_copy(&self, _ctx: &mut CopyContext) -> Self {
            self.clone()
        }
    }

    impl ArrayElement for Url {
        type Kind = Block;
    }
}

#[cfg(feature = "time")]
mod time_impl {
    use crate::array::{ArrayElement, Block};
    use crate::policy::ImmutableType;
    use crate::{CopyContext, DeepCopy};
    use time::OffsetDateTime;

    unsafe impl ImmutableType for OffsetDateTime {}

    impl DeepCopy for OffsetDateTime {
        fn deep_copy(&self, _ctx: &mut CopyContext) -> Self {
            *self
        }
    }

    impl ArrayElement for OffsetDateTime {
        type Kind = Block;
    }
}
