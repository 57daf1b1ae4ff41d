// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod breaches;
pub mod demo;
pub mod doctor;
pub mod escalate;
pub mod expenses;
pub mod pipeline;
pub mod policy;
pub mod recommend;
pub mod settings;
pub mod usage;
