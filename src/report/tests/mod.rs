//! Report component tests, driven through the public pipeline entry points
//! against wiremock-backed status and catalog APIs.


use super::ReportGenerator;
use super::test_helpers::*;
use crate::error::{Error, StorageError};
use crate::types::JobId;
use std::sync::Arc;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
