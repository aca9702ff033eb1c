// Copyright (c) 2026 framewatch contributors
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT
// See the LICENSE file at the repository root.
// src/core/mod.rs
pub mod capture_loop;
pub mod detector;
pub mod discontinuity;
pub mod incident;
pub mod saturation;
pub mod timing;
pub mod window;
