//! Operations the bootstrapper application calls on the engine.
//!
//! String-returning operations carry `cch_*` in their results: on the way out
//! it is the caller's capacity in UTF-16 units (terminator included), on the
//! way back the engine's length, or the required size when the reply status
//! is more-data.

use super::types::*;
use crate::codec::{BufferReader, BufferWriter, WireStruct, WireValue, API_VERSION};
use crate::error::Result;

crate::message_set! {
    /// Any engine operation, decoded on the engine side.
    pub enum EngineRequest;

    /// Engine-side operation handlers.
    pub trait EngineCallbacks;

    1 => GetPackageCount / get_package_count {
        args GetPackageCountArgs {}
        results GetPackageCountResults { package_count: u32 }
    }
    2 => GetVariableNumeric / get_variable_numeric {
        args GetVariableNumericArgs { variable: Option<String> }
        results GetVariableNumericResults { value: i64 }
    }
    3 => GetVariableString / get_variable_string {
        args GetVariableStringArgs { variable: Option<String> }
        results GetVariableStringResults { cch_value: u32, value: Option<String> }
    }
    4 => GetVariableVersion / get_variable_version {
        args GetVariableVersionArgs { variable: Option<String> }
        results GetVariableVersionResults { cch_value: u32, value: Option<String> }
    }
    5 => FormatString / format_string {
        args FormatStringArgs { input: Option<String> }
        results FormatStringResults { cch_out: u32, out: Option<String> }
    }
    6 => EscapeString / escape_string {
        args EscapeStringArgs { input: Option<String> }
        results EscapeStringResults { cch_out: u32, out: Option<String> }
    }
    7 => EvaluateCondition / evaluate_condition {
        args EvaluateConditionArgs { condition: Option<String> }
        results EvaluateConditionResults { value: bool }
    }
    8 => Log / log {
        args LogArgs { level: LogLevel, message: Option<String> }
        results LogResults {}
    }
    9 => SendEmbeddedError / send_embedded_error {
        args SendEmbeddedErrorArgs {
            error_code: u32,
            message: Option<String>,
            ui_hint: u32,
        }
        results SendEmbeddedErrorResults { result: i32 }
    }
    10 => SendEmbeddedProgress / send_embedded_progress {
        args SendEmbeddedProgressArgs { progress_percentage: u32, overall_percentage: u32 }
        results SendEmbeddedProgressResults { result: i32 }
    }
    /// Register an update bundle. The args are laid out by hand.
    11 => SetUpdate / set_update {
        args SetUpdateArgs extern
        results SetUpdateResults {}
    }
    12 => SetLocalSource / set_local_source {
        args SetLocalSourceArgs {
            package_or_container_id: Option<String>,
            payload_id: Option<String>,
            path: Option<String>,
        }
        results SetLocalSourceResults {}
    }
    13 => SetDownloadSource / set_download_source {
        args SetDownloadSourceArgs {
            package_or_container_id: Option<String>,
            payload_id: Option<String>,
            url: Option<String>,
            user: Option<String>,
            password: Option<String>,
            authorization_header: Option<String>,
        }
        results SetDownloadSourceResults {}
    }
    14 => SetVariableNumeric / set_variable_numeric {
        args SetVariableNumericArgs { variable: Option<String>, value: i64 }
        results SetVariableNumericResults {}
    }
    15 => SetVariableString / set_variable_string {
        args SetVariableStringArgs {
            variable: Option<String>,
            value: Option<String>,
            formatted: bool,
        }
        results SetVariableStringResults {}
    }
    16 => SetVariableVersion / set_variable_version {
        args SetVariableVersionArgs { variable: Option<String>, value: Option<String> }
        results SetVariableVersionResults {}
    }
    17 => CloseSplashScreen / close_splash_screen {
        args CloseSplashScreenArgs {}
        results CloseSplashScreenResults {}
    }
    18 => Detect / detect {
        args DetectArgs { parent_window: u64 }
        results DetectResults {}
    }
    19 => Plan / plan {
        args PlanArgs { action: Action }
        results PlanResults {}
    }
    20 => Elevate / elevate {
        args ElevateArgs { parent_window: u64 }
        results ElevateResults {}
    }
    21 => Apply / apply {
        args ApplyArgs { parent_window: u64 }
        results ApplyResults {}
    }
    22 => Quit / quit {
        args QuitArgs { exit_code: u32 }
        results QuitResults {}
    }
    23 => LaunchApprovedExe / launch_approved_exe {
        args LaunchApprovedExeArgs {
            parent_window: u64,
            approved_exe_for_elevation_id: Option<String>,
            arguments: Option<String>,
            wait_for_input_idle_timeout: u32,
        }
        results LaunchApprovedExeResults {}
    }
    24 => SetUpdateSource / set_update_source {
        args SetUpdateSourceArgs { url: Option<String>, authorization_header: Option<String> }
        results SetUpdateSourceResults {}
    }
    25 => CompareVersions / compare_versions {
        args CompareVersionsArgs { version1: Option<String>, version2: Option<String> }
        results CompareVersionsResults { result: i32 }
    }
    26 => GetRelatedBundleVariable / get_related_bundle_variable {
        args GetRelatedBundleVariableArgs {
            bundle_code: Option<String>,
            variable: Option<String>,
        }
        results GetRelatedBundleVariableResults { cch_value: u32, value: Option<String> }
    }
}

/// Args of [`SetUpdate`].
///
/// Existing engines expect `hash` on the wire twice: once in its own slot and
/// again right before `update_package_id`. The second copy is written from
/// the same field and skipped when decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetUpdateArgs {
    pub version: u32,
    pub local_source: Option<String>,
    pub download_source: Option<String>,
    pub size: u64,
    pub hash_type: UpdateHashType,
    pub hash: Option<String>,
    pub update_package_id: Option<String>,
}

impl Default for SetUpdateArgs {
    fn default() -> Self {
        Self {
            version: API_VERSION,
            local_source: None,
            download_source: None,
            size: 0,
            hash_type: UpdateHashType::default(),
            hash: None,
            update_package_id: None,
        }
    }
}

impl WireStruct for SetUpdateArgs {
    fn version(&self) -> u32 {
        self.version
    }

    fn encode_into(&self, writer: &mut BufferWriter) {
        writer.write_u32(self.version);
        self.local_source.write_to(writer);
        self.download_source.write_to(writer);
        self.size.write_to(writer);
        self.hash_type.write_to(writer);
        self.hash.write_to(writer);
        self.hash.write_to(writer);
        self.update_package_id.write_to(writer);
    }

    fn decode_from(reader: &mut BufferReader<'_>) -> Result<Self> {
        let mut value = Self {
            version: reader.read_u32()?,
            ..Self::default()
        };

        macro_rules! field {
            ($target:expr) => {
                if reader.is_empty() {
                    return Ok(value);
                }
                $target = WireValue::read_from(reader)?;
            };
        }

        field!(value.local_source);
        field!(value.download_source);
        field!(value.size);
        field!(value.hash_type);
        field!(value.hash);
        if reader.is_empty() {
            return Ok(value);
        }
        let _repeated_hash: Option<String> = WireValue::read_from(reader)?;
        field!(value.update_package_id);
        Ok(value)
    }
}
