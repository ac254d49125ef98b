// Copyright (c) Coinkeep.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod adjust;
pub mod categories;
pub mod doctor;
pub mod exporter;
pub mod profiles;
pub mod rates;
pub mod scheduled;
pub mod transactions;
pub mod transfers;
pub mod wallets;
