//! [`Hotel`]-related read definitions.

#[cfg(doc)]
use crate::domain::Hotel;

pub mod list {
    //! [`Hotel`] list definitions.

    use common::Money;
    use rust_decimal::Decimal;

    use crate::domain::{hotel, Hotel};
    #[cfg(doc)]
    use crate::domain::Room;

    /// Filter of a [`Hotel`] list.
    ///
    /// All the specified criteria must match.
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// [`hotel::City`] a [`Hotel`] is located in.
        pub city: Option<hotel::City>,

        /// [`hotel::Country`] a [`Hotel`] is located in.
        pub country: Option<hotel::Country>,

        /// Lower bound of a [`Room`] nightly price (inclusive).
        ///
        /// [`Hotel`] matches if at least one of its [`Room`]s is within the
        /// price bounds.
        pub min_price: Option<Money>,

        /// Upper bound of a [`Room`] nightly price (inclusive).
        ///
        /// [`Hotel`] matches if at least one of its [`Room`]s is within the
        /// price bounds.
        pub max_price: Option<Money>,

        /// Lower bound of a [`hotel::Rating::average`] (inclusive).
        ///
        /// [`Hotel`]s without reviews never match it.
        pub min_rating: Option<Decimal>,
    }

    impl Filter {
        /// Indicates whether this [`Filter`] has any price bounds.
        #[must_use]
        pub const fn bounds_price(&self) -> bool {
            self.min_price.is_some() || self.max_price.is_some()
        }

        /// Indicates whether the provided nightly `price` is within the price
        /// bounds of this [`Filter`].
        #[must_use]
        pub fn admits_price(&self, price: Money) -> bool {
            self.min_price.map_or(true, |min| price >= min)
                && self.max_price.map_or(true, |max| price <= max)
        }
    }

    /// Item of a [`Hotel`] list.
    #[derive(Clone, Debug)]
    pub struct Item {
        /// Listed [`Hotel`].
        pub hotel: Hotel,

        /// Lowest nightly price among all the [`Room`]s of the [`Hotel`], if
        /// it has any.
        pub min_price: Option<Money>,
    }
}
