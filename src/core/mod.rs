// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Core functionalities of the network.

pub mod conv;
pub mod error;
pub mod extractor;
pub mod layer;
pub mod model;
pub mod recurrent;
pub mod tensor;
