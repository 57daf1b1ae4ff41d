// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod boundary;
pub mod cli;
pub mod commands;
pub mod db;
pub mod detector;
pub mod error;
pub mod escalation;
pub mod ledger;
pub mod models;
pub mod policy;
pub mod recommender;
pub mod thresholds;
pub mod utils;
