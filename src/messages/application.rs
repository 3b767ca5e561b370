//! Notifications sent by the engine to the bootstrapper application.
//!
//! Type ids are stable and start at 1. Most `*Begin` and progress messages
//! let the BA cancel through a `cancel` result.

use super::types::*;
use crate::status::Status;

crate::message_set! {
    /// Any notification the engine can send, decoded.
    pub enum Notification;

    /// Per-notification handlers.
    ///
    /// Every method defaults to `Ok(())`, leaving the results skeleton the
    /// engine sent untouched.
    pub trait ApplicationCallbacks;

    /// Detection is starting.
    1 => DetectBegin / on_detect_begin {
        args DetectBeginArgs {
            cached: bool,
            registration_type: RegistrationType,
            package_count: u32,
        }
        results DetectBeginResults { cancel: bool }
    }
    2 => DetectComplete / on_detect_complete {
        args DetectCompleteArgs { status: Status, eligible_for_cleanup: bool }
        results DetectCompleteResults {}
    }
    /// Planning is starting.
    3 => PlanBegin / on_plan_begin {
        args PlanBeginArgs { package_count: u32 }
        results PlanBeginResults { cancel: bool }
    }
    4 => PlanComplete / on_plan_complete {
        args PlanCompleteArgs { status: Status }
        results PlanCompleteResults {}
    }
    /// First notification after the BA is loaded.
    5 => Startup / on_startup {
        args StartupArgs {}
        results StartupResults {}
    }
    /// Last notification; the BA may ask for a restart or reload.
    6 => Shutdown / on_shutdown {
        args ShutdownArgs {}
        results ShutdownResults { action: ShutdownAction }
    }
    7 => DetectUpdateBegin / on_detect_update_begin {
        args DetectUpdateBeginArgs { update_location: Option<String> }
        results DetectUpdateBeginResults { cancel: bool, skip: bool }
    }
    8 => DetectUpdate / on_detect_update {
        args DetectUpdateArgs {
            update_location: Option<String>,
            size: u64,
            hash: Option<String>,
            hash_algorithm: UpdateHashType,
            update_version: Option<String>,
            title: Option<String>,
            summary: Option<String>,
            content_type: Option<String>,
            content: Option<String>,
        }
        results DetectUpdateResults { cancel: bool, stop_processing_updates: bool }
    }
    9 => DetectUpdateComplete / on_detect_update_complete {
        args DetectUpdateCompleteArgs { status: Status }
        results DetectUpdateCompleteResults { ignore_error: bool }
    }
    10 => DetectRelatedBundle / on_detect_related_bundle {
        args DetectRelatedBundleArgs {
            bundle_code: Option<String>,
            relation_type: RelationType,
            bundle_tag: Option<String>,
            per_machine: bool,
            bundle_version: Option<String>,
            missing_from_cache: bool,
        }
        results DetectRelatedBundleResults { cancel: bool }
    }
    11 => DetectPackageBegin / on_detect_package_begin {
        args DetectPackageBeginArgs { package_id: Option<String> }
        results DetectPackageBeginResults { cancel: bool }
    }
    12 => DetectRelatedMsiPackage / on_detect_related_msi_package {
        args DetectRelatedMsiPackageArgs {
            package_id: Option<String>,
            upgrade_code: Option<String>,
            product_code: Option<String>,
            per_machine: bool,
            package_version: Option<String>,
            operation: RelatedOperation,
        }
        results DetectRelatedMsiPackageResults { cancel: bool }
    }
    13 => DetectPatchTarget / on_detect_patch_target {
        args DetectPatchTargetArgs {
            package_id: Option<String>,
            product_code: Option<String>,
            patch_state: PackageState,
        }
        results DetectPatchTargetResults { cancel: bool }
    }
    14 => DetectMsiFeature / on_detect_msi_feature {
        args DetectMsiFeatureArgs {
            package_id: Option<String>,
            feature_id: Option<String>,
            state: FeatureState,
        }
        results DetectMsiFeatureResults { cancel: bool }
    }
    15 => DetectPackageComplete / on_detect_package_complete {
        args DetectPackageCompleteArgs {
            package_id: Option<String>,
            status: Status,
            state: PackageState,
            cached: bool,
        }
        results DetectPackageCompleteResults {}
    }
    16 => PlanRelatedBundle / on_plan_related_bundle {
        args PlanRelatedBundleArgs {
            bundle_code: Option<String>,
            recommended_state: RequestState,
        }
        results PlanRelatedBundleResults { requested_state: RequestState, cancel: bool }
    }
    /// The engine is about to plan one package; the BA may change the request.
    17 => PlanPackageBegin / on_plan_package_begin {
        args PlanPackageBeginArgs {
            package_id: Option<String>,
            state: PackageState,
            cached: bool,
            install_condition: PackageConditionResult,
            repair_condition: PackageConditionResult,
            recommended_state: RequestState,
            recommended_cache_type: CacheType,
        }
        results PlanPackageBeginResults {
            requested_state: RequestState,
            requested_cache_type: CacheType,
            cancel: bool,
        }
    }
    18 => PlanPatchTarget / on_plan_patch_target {
        args PlanPatchTargetArgs {
            package_id: Option<String>,
            product_code: Option<String>,
            recommended_state: RequestState,
        }
        results PlanPatchTargetResults { requested_state: RequestState, cancel: bool }
    }
    19 => PlanMsiFeature / on_plan_msi_feature {
        args PlanMsiFeatureArgs {
            package_id: Option<String>,
            feature_id: Option<String>,
            recommended_state: FeatureState,
        }
        results PlanMsiFeatureResults { requested_state: FeatureState, cancel: bool }
    }
    20 => PlanPackageComplete / on_plan_package_complete {
        args PlanPackageCompleteArgs {
            package_id: Option<String>,
            status: Status,
            requested: RequestState,
        }
        results PlanPackageCompleteResults {}
    }
    21 => ApplyBegin / on_apply_begin {
        args ApplyBeginArgs { phase_count: u32 }
        results ApplyBeginResults { cancel: bool }
    }
    22 => ElevateBegin / on_elevate_begin {
        args ElevateBeginArgs {}
        results ElevateBeginResults { cancel: bool }
    }
    23 => ElevateComplete / on_elevate_complete {
        args ElevateCompleteArgs { status: Status }
        results ElevateCompleteResults {}
    }
    24 => Progress / on_progress {
        args ProgressArgs { progress_percentage: u32, overall_percentage: u32 }
        results ProgressResults { cancel: bool }
    }
    /// An error the BA may answer with a dialog result.
    25 => Error / on_error {
        args ErrorArgs {
            error_type: ErrorType,
            package_id: Option<String>,
            code: u32,
            error: Option<String>,
            ui_hint: u32,
            data: Vec<String>,
            recommendation: i32,
        }
        results ErrorResults { result: i32 }
    }
    26 => RegisterBegin / on_register_begin {
        args RegisterBeginArgs { recommended_registration_type: RegistrationType }
        results RegisterBeginResults { cancel: bool, registration_type: RegistrationType }
    }
    27 => RegisterComplete / on_register_complete {
        args RegisterCompleteArgs { status: Status }
        results RegisterCompleteResults {}
    }
    28 => CacheBegin / on_cache_begin {
        args CacheBeginArgs {}
        results CacheBeginResults { cancel: bool }
    }
    29 => CachePackageBegin / on_cache_package_begin {
        args CachePackageBeginArgs {
            package_id: Option<String>,
            cache_payloads: u32,
            package_cache_size: u64,
            vital: bool,
        }
        results CachePackageBeginResults { cancel: bool }
    }
    30 => CacheAcquireBegin / on_cache_acquire_begin {
        args CacheAcquireBeginArgs {
            package_or_container_id: Option<String>,
            payload_id: Option<String>,
            source: Option<String>,
            download_url: Option<String>,
            payload_container_id: Option<String>,
            recommendation: CacheOperation,
        }
        results CacheAcquireBeginResults { action: CacheOperation, cancel: bool }
    }
    31 => CacheAcquireProgress / on_cache_acquire_progress {
        args CacheAcquireProgressArgs {
            package_or_container_id: Option<String>,
            payload_id: Option<String>,
            progress: u64,
            total: u64,
            overall_percentage: u32,
        }
        results CacheAcquireProgressResults { cancel: bool }
    }
    32 => CacheAcquireResolving / on_cache_acquire_resolving {
        args CacheAcquireResolvingArgs {
            package_or_container_id: Option<String>,
            payload_id: Option<String>,
            search_paths: Vec<String>,
            found_local: bool,
            recommended_search_path: u32,
            download_url: Option<String>,
            payload_container_id: Option<String>,
            recommendation: CacheResolveOperation,
        }
        results CacheAcquireResolvingResults {
            chosen_search_path: u32,
            action: CacheResolveOperation,
            cancel: bool,
        }
    }
    33 => CacheAcquireComplete / on_cache_acquire_complete {
        args CacheAcquireCompleteArgs {
            package_or_container_id: Option<String>,
            payload_id: Option<String>,
            status: Status,
            recommendation: CacheAcquireCompleteAction,
        }
        results CacheAcquireCompleteResults { action: CacheAcquireCompleteAction }
    }
    34 => CacheVerifyBegin / on_cache_verify_begin {
        args CacheVerifyBeginArgs {
            package_or_container_id: Option<String>,
            payload_id: Option<String>,
        }
        results CacheVerifyBeginResults { cancel: bool }
    }
    35 => CacheVerifyComplete / on_cache_verify_complete {
        args CacheVerifyCompleteArgs {
            package_or_container_id: Option<String>,
            payload_id: Option<String>,
            status: Status,
            recommendation: CacheVerifyCompleteAction,
        }
        results CacheVerifyCompleteResults { action: CacheVerifyCompleteAction }
    }
    36 => CachePackageComplete / on_cache_package_complete {
        args CachePackageCompleteArgs {
            package_id: Option<String>,
            status: Status,
            recommendation: CachePackageCompleteAction,
        }
        results CachePackageCompleteResults { action: CachePackageCompleteAction }
    }
    37 => CacheComplete / on_cache_complete {
        args CacheCompleteArgs { status: Status }
        results CacheCompleteResults {}
    }
    38 => ExecuteBegin / on_execute_begin {
        args ExecuteBeginArgs { executing_packages: u32 }
        results ExecuteBeginResults { cancel: bool }
    }
    39 => ExecutePackageBegin / on_execute_package_begin {
        args ExecutePackageBeginArgs {
            package_id: Option<String>,
            execute: bool,
            action: ActionState,
            ui_level: u32,
            disable_external_ui_handler: bool,
        }
        results ExecutePackageBeginResults { cancel: bool }
    }
    40 => ExecutePatchTarget / on_execute_patch_target {
        args ExecutePatchTargetArgs {
            package_id: Option<String>,
            target_product_code: Option<String>,
        }
        results ExecutePatchTargetResults { cancel: bool }
    }
    41 => ExecuteProgress / on_execute_progress {
        args ExecuteProgressArgs {
            package_id: Option<String>,
            progress_percentage: u32,
            overall_percentage: u32,
        }
        results ExecuteProgressResults { cancel: bool }
    }
    42 => ExecuteMsiMessage / on_execute_msi_message {
        args ExecuteMsiMessageArgs {
            package_id: Option<String>,
            message_type: u32,
            ui_hint: u32,
            message: Option<String>,
            data: Vec<String>,
            recommendation: i32,
        }
        results ExecuteMsiMessageResults { result: i32 }
    }
    43 => ExecuteFilesInUse / on_execute_files_in_use {
        args ExecuteFilesInUseArgs {
            package_id: Option<String>,
            files: Vec<String>,
            recommendation: i32,
            source: FilesInUseType,
        }
        results ExecuteFilesInUseResults { result: i32 }
    }
    44 => ExecutePackageComplete / on_execute_package_complete {
        args ExecutePackageCompleteArgs {
            package_id: Option<String>,
            status: Status,
            restart: ApplyRestart,
            recommendation: ExecutePackageCompleteAction,
        }
        results ExecutePackageCompleteResults { action: ExecutePackageCompleteAction }
    }
    45 => ExecuteComplete / on_execute_complete {
        args ExecuteCompleteArgs { status: Status }
        results ExecuteCompleteResults {}
    }
    46 => UnregisterBegin / on_unregister_begin {
        args UnregisterBeginArgs { recommended_registration_type: RegistrationType }
        results UnregisterBeginResults { registration_type: RegistrationType }
    }
    47 => UnregisterComplete / on_unregister_complete {
        args UnregisterCompleteArgs { status: Status }
        results UnregisterCompleteResults {}
    }
    48 => ApplyComplete / on_apply_complete {
        args ApplyCompleteArgs {
            status: Status,
            restart: ApplyRestart,
            recommendation: ApplyCompleteAction,
        }
        results ApplyCompleteResults { action: ApplyCompleteAction }
    }
    49 => LaunchApprovedExeBegin / on_launch_approved_exe_begin {
        args LaunchApprovedExeBeginArgs {}
        results LaunchApprovedExeBeginResults { cancel: bool }
    }
    50 => LaunchApprovedExeComplete / on_launch_approved_exe_complete {
        args LaunchApprovedExeCompleteArgs { status: Status, process_id: u32 }
        results LaunchApprovedExeCompleteResults {}
    }
    51 => PlanMsiPackage / on_plan_msi_package {
        args PlanMsiPackageArgs {
            package_id: Option<String>,
            execute: bool,
            action: ActionState,
            recommended_file_versioning: MsiFileVersioning,
        }
        results PlanMsiPackageResults {
            cancel: bool,
            action_msi_property: MsiProperty,
            ui_level: u32,
            disable_external_ui_handler: bool,
            file_versioning: MsiFileVersioning,
        }
    }
    52 => BeginMsiTransactionBegin / on_begin_msi_transaction_begin {
        args BeginMsiTransactionBeginArgs { transaction_id: Option<String> }
        results BeginMsiTransactionBeginResults { cancel: bool }
    }
    53 => BeginMsiTransactionComplete / on_begin_msi_transaction_complete {
        args BeginMsiTransactionCompleteArgs { transaction_id: Option<String>, status: Status }
        results BeginMsiTransactionCompleteResults {}
    }
    54 => CommitMsiTransactionBegin / on_commit_msi_transaction_begin {
        args CommitMsiTransactionBeginArgs { transaction_id: Option<String> }
        results CommitMsiTransactionBeginResults { cancel: bool }
    }
    55 => CommitMsiTransactionComplete / on_commit_msi_transaction_complete {
        args CommitMsiTransactionCompleteArgs {
            transaction_id: Option<String>,
            status: Status,
            restart: ApplyRestart,
            recommendation: MsiTransactionCompleteAction,
        }
        results CommitMsiTransactionCompleteResults { action: MsiTransactionCompleteAction }
    }
    56 => RollbackMsiTransactionBegin / on_rollback_msi_transaction_begin {
        args RollbackMsiTransactionBeginArgs { transaction_id: Option<String> }
        results RollbackMsiTransactionBeginResults {}
    }
    57 => RollbackMsiTransactionComplete / on_rollback_msi_transaction_complete {
        args RollbackMsiTransactionCompleteArgs {
            transaction_id: Option<String>,
            status: Status,
            restart: ApplyRestart,
            recommendation: MsiTransactionCompleteAction,
        }
        results RollbackMsiTransactionCompleteResults { action: MsiTransactionCompleteAction }
    }
    58 => PauseAutomaticUpdatesBegin / on_pause_automatic_updates_begin {
        args PauseAutomaticUpdatesBeginArgs {}
        results PauseAutomaticUpdatesBeginResults {}
    }
    59 => PauseAutomaticUpdatesComplete / on_pause_automatic_updates_complete {
        args PauseAutomaticUpdatesCompleteArgs { status: Status }
        results PauseAutomaticUpdatesCompleteResults {}
    }
    60 => SystemRestorePointBegin / on_system_restore_point_begin {
        args SystemRestorePointBeginArgs {}
        results SystemRestorePointBeginResults {}
    }
    61 => SystemRestorePointComplete / on_system_restore_point_complete {
        args SystemRestorePointCompleteArgs { status: Status }
        results SystemRestorePointCompleteResults {}
    }
    62 => PlannedPackage / on_planned_package {
        args PlannedPackageArgs {
            package_id: Option<String>,
            execute: ActionState,
            rollback: ActionState,
            planned_cache: bool,
            planned_uncache: bool,
        }
        results PlannedPackageResults {}
    }
    63 => PlanForwardCompatibleBundle / on_plan_forward_compatible_bundle {
        args PlanForwardCompatibleBundleArgs {
            bundle_code: Option<String>,
            relation_type: RelationType,
            bundle_tag: Option<String>,
            per_machine: bool,
            bundle_version: Option<String>,
            recommended_ignore_bundle: bool,
        }
        results PlanForwardCompatibleBundleResults { cancel: bool, ignore_bundle: bool }
    }
    64 => CacheVerifyProgress / on_cache_verify_progress {
        args CacheVerifyProgressArgs {
            package_or_container_id: Option<String>,
            payload_id: Option<String>,
            progress: u64,
            total: u64,
            overall_percentage: u32,
            verify_step: CacheVerifyStep,
        }
        results CacheVerifyProgressResults { cancel: bool }
    }
    65 => CacheContainerOrPayloadVerifyBegin / on_cache_container_or_payload_verify_begin {
        args CacheContainerOrPayloadVerifyBeginArgs {
            package_or_container_id: Option<String>,
            payload_id: Option<String>,
        }
        results CacheContainerOrPayloadVerifyBeginResults { cancel: bool }
    }
    66 => CacheContainerOrPayloadVerifyComplete / on_cache_container_or_payload_verify_complete {
        args CacheContainerOrPayloadVerifyCompleteArgs {
            package_or_container_id: Option<String>,
            payload_id: Option<String>,
            status: Status,
        }
        results CacheContainerOrPayloadVerifyCompleteResults {}
    }
    67 => CacheContainerOrPayloadVerifyProgress / on_cache_container_or_payload_verify_progress {
        args CacheContainerOrPayloadVerifyProgressArgs {
            package_or_container_id: Option<String>,
            payload_id: Option<String>,
            progress: u64,
            total: u64,
            overall_percentage: u32,
        }
        results CacheContainerOrPayloadVerifyProgressResults { cancel: bool }
    }
    68 => CachePayloadExtractBegin / on_cache_payload_extract_begin {
        args CachePayloadExtractBeginArgs {
            container_id: Option<String>,
            payload_id: Option<String>,
        }
        results CachePayloadExtractBeginResults { cancel: bool }
    }
    69 => CachePayloadExtractComplete / on_cache_payload_extract_complete {
        args CachePayloadExtractCompleteArgs {
            container_id: Option<String>,
            payload_id: Option<String>,
            status: Status,
        }
        results CachePayloadExtractCompleteResults {}
    }
    70 => CachePayloadExtractProgress / on_cache_payload_extract_progress {
        args CachePayloadExtractProgressArgs {
            container_id: Option<String>,
            payload_id: Option<String>,
            progress: u64,
            total: u64,
            overall_percentage: u32,
        }
        results CachePayloadExtractProgressResults { cancel: bool }
    }
    71 => PlanRollbackBoundary / on_plan_rollback_boundary {
        args PlanRollbackBoundaryArgs {
            rollback_boundary_id: Option<String>,
            recommended_transaction: bool,
        }
        results PlanRollbackBoundaryResults { transaction: bool, cancel: bool }
    }
    72 => DetectCompatibleMsiPackage / on_detect_compatible_msi_package {
        args DetectCompatibleMsiPackageArgs {
            package_id: Option<String>,
            compatible_package_id: Option<String>,
            compatible_package_version: Option<String>,
        }
        results DetectCompatibleMsiPackageResults { cancel: bool }
    }
    73 => PlanCompatibleMsiPackageBegin / on_plan_compatible_msi_package_begin {
        args PlanCompatibleMsiPackageBeginArgs {
            package_id: Option<String>,
            compatible_package_id: Option<String>,
            compatible_package_version: Option<String>,
            recommended_remove: bool,
        }
        results PlanCompatibleMsiPackageBeginResults { request_remove: bool, cancel: bool }
    }
    74 => PlanCompatibleMsiPackageComplete / on_plan_compatible_msi_package_complete {
        args PlanCompatibleMsiPackageCompleteArgs {
            package_id: Option<String>,
            compatible_package_id: Option<String>,
            status: Status,
            requested_remove: bool,
        }
        results PlanCompatibleMsiPackageCompleteResults {}
    }
    75 => PlannedCompatiblePackage / on_planned_compatible_package {
        args PlannedCompatiblePackageArgs {
            package_id: Option<String>,
            compatible_package_id: Option<String>,
            remove: bool,
        }
        results PlannedCompatiblePackageResults {}
    }
    76 => PlanRestoreRelatedBundle / on_plan_restore_related_bundle {
        args PlanRestoreRelatedBundleArgs {
            bundle_code: Option<String>,
            recommended_state: RequestState,
        }
        results PlanRestoreRelatedBundleResults { requested_state: RequestState, cancel: bool }
    }
    77 => PlanRelatedBundleType / on_plan_related_bundle_type {
        args PlanRelatedBundleTypeArgs {
            bundle_code: Option<String>,
            recommended_type: RelatedBundlePlanType,
        }
        results PlanRelatedBundleTypeResults {
            requested_type: RelatedBundlePlanType,
            cancel: bool,
        }
    }
    /// The engine would downgrade; the BA picks the final status.
    78 => ApplyDowngrade / on_apply_downgrade {
        args ApplyDowngradeArgs { recommended_status: Status }
        results ApplyDowngradeResults { status: Status }
    }
    79 => ExecuteProcessCancel / on_execute_process_cancel {
        args ExecuteProcessCancelArgs {
            package_id: Option<String>,
            process_id: u32,
            recommendation: ExecuteProcessCancelAction,
        }
        results ExecuteProcessCancelResults { action: ExecuteProcessCancelAction }
    }
    80 => DetectRelatedBundlePackage / on_detect_related_bundle_package {
        args DetectRelatedBundlePackageArgs {
            package_id: Option<String>,
            bundle_code: Option<String>,
            relation_type: RelationType,
            per_machine: bool,
            bundle_version: Option<String>,
        }
        results DetectRelatedBundlePackageResults { cancel: bool }
    }
    81 => CachePackageNonVitalValidationFailure / on_cache_package_non_vital_validation_failure {
        args CachePackageNonVitalValidationFailureArgs {
            package_id: Option<String>,
            status: Status,
            recommendation: NonVitalValidationFailureAction,
        }
        results CachePackageNonVitalValidationFailureResults {
            action: NonVitalValidationFailureAction,
        }
    }
}
