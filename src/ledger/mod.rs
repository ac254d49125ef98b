// Copyright (c) Coinkeep.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod adjust;
pub mod balance;
pub mod events;
pub mod rates;
pub mod schedule;
pub mod store;
pub mod transactions;
pub mod transfers;
pub mod wallets;
