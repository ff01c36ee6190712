// SPDX-License-Identifier: MIT

pub mod run;
pub mod services;
pub mod validate;
