// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The NV4 core: one subsystem module per register block, wired
//! together by [`device`].

pub mod config;
pub mod device;
pub mod error;
pub mod mmio;
pub mod pbus;
pub mod pextdev;
pub mod pfb;
pub mod pfifo;
pub mod pgraph;
pub mod pmc;
pub mod pme;
pub mod pramdac;
pub mod ptimer;
pub mod pvideo;
pub mod ramin;
pub mod rasterizer;
pub mod regnames;
