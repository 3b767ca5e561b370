//! Enumerations shared by engine operations and notifications.

use crate::wire_enum;

wire_enum! {
    /// Top-level action the bundle is planned for.
    pub enum Action {
        Unknown = 0,
        Help = 1,
        Layout = 2,
        UnsafeUninstall = 3,
        Uninstall = 4,
        Cache = 5,
        Install = 6,
        Modify = 7,
        Repair = 8,
        UpdateReplace = 9,
        UpdateReplaceEmbedded = 10,
    }
}

wire_enum! {
    /// Per-package execution action.
    pub enum ActionState {
        None = 0,
        Uninstall = 1,
        Install = 2,
        Modify = 3,
        Mend = 4,
        Repair = 5,
        MinorUpgrade = 6,
    }
}

wire_enum! {
    /// Detected package state.
    pub enum PackageState {
        Unknown = 0,
        Obsolete = 1,
        Absent = 2,
        Present = 3,
        Superseded = 4,
    }
}

wire_enum! {
    /// Requested package state.
    pub enum RequestState {
        None = 0,
        ForceAbsent = 1,
        Absent = 2,
        Cache = 3,
        Present = 4,
        ForcePresent = 5,
        Repair = 6,
    }
}

wire_enum! {
    pub enum FeatureState {
        Unknown = 0,
        Absent = 1,
        Local = 2,
        Source = 3,
    }
}

wire_enum! {
    pub enum RelationType {
        None = 0,
        Detect = 1,
        Upgrade = 2,
        Addon = 3,
        Patch = 4,
        DependentAddon = 5,
        DependentPatch = 6,
        Update = 7,
    }
}

wire_enum! {
    pub enum RelatedBundlePlanType {
        None = 0,
        Downgrade = 1,
        Upgrade = 2,
        Addon = 3,
        Patch = 4,
        DependentAddon = 5,
        DependentPatch = 6,
    }
}

wire_enum! {
    /// How a related MSI package relates to the one being detected.
    pub enum RelatedOperation {
        None = 0,
        Downgrade = 1,
        MinorUpdate = 2,
        MajorUpgrade = 3,
        Remove = 4,
        Install = 5,
        Repair = 6,
    }
}

wire_enum! {
    pub enum RegistrationType {
        None = 0,
        InProgress = 1,
        Full = 2,
    }
}

wire_enum! {
    pub enum PackageConditionResult {
        Default = 0,
        False = 1,
        True = 2,
    }
}

wire_enum! {
    pub enum CacheType {
        Remove = 0,
        Keep = 1,
        Force = 2,
    }
}

wire_enum! {
    pub enum ErrorType {
        Elevate = 0,
        WindowsInstaller = 1,
        ExePackage = 2,
        HttpAuthServer = 3,
        HttpAuthProxy = 4,
        Apply = 5,
    }
}

wire_enum! {
    pub enum ApplyRestart {
        None = 0,
        Required = 1,
        Initiated = 2,
    }
}

wire_enum! {
    pub enum ShutdownAction {
        None = 0,
        Restart = 1,
        ReloadBootstrapper = 2,
        RestartBootstrapper = 3,
    }
}

wire_enum! {
    pub enum CacheOperation {
        None = 0,
        Copy = 1,
        Download = 2,
        Extract = 3,
    }
}

wire_enum! {
    pub enum CacheResolveOperation {
        None = 0,
        Local = 1,
        Download = 2,
        Container = 3,
        Retry = 4,
    }
}

wire_enum! {
    pub enum CacheVerifyStep {
        Stage = 0,
        Hash = 1,
        Finalize = 2,
    }
}

wire_enum! {
    pub enum FilesInUseType {
        Msi = 0,
        MsiRm = 1,
        Netfx = 2,
    }
}

wire_enum! {
    pub enum MsiFileVersioning {
        Missing = 0,
        Older = 1,
        All = 2,
    }
}

wire_enum! {
    pub enum MsiProperty {
        None = 0,
        Uninstall = 1,
        Repair = 2,
        Patch = 3,
    }
}

wire_enum! {
    pub enum UpdateHashType {
        None = 0,
        Sha512 = 1,
    }
}

wire_enum! {
    pub enum LogLevel {
        None = 0,
        Standard = 1,
        Verbose = 2,
        Debug = 3,
        Error = 4,
    }
}

wire_enum! {
    pub enum CacheAcquireCompleteAction {
        None = 0,
        Retry = 1,
    }
}

wire_enum! {
    pub enum CacheVerifyCompleteAction {
        None = 0,
        RetryVerification = 1,
        RetryAcquisition = 2,
    }
}

wire_enum! {
    pub enum CachePackageCompleteAction {
        None = 0,
        Ignore = 1,
        Retry = 2,
    }
}

wire_enum! {
    pub enum ExecutePackageCompleteAction {
        None = 0,
        Ignore = 1,
        Retry = 2,
        Restart = 3,
        Suspend = 4,
    }
}

wire_enum! {
    pub enum ApplyCompleteAction {
        None = 0,
        Restart = 1,
    }
}

wire_enum! {
    pub enum MsiTransactionCompleteAction {
        None = 0,
        Restart = 1,
    }
}

wire_enum! {
    pub enum ExecuteProcessCancelAction {
        Abandon = 0,
        Wait = 1,
    }
}

wire_enum! {
    pub enum NonVitalValidationFailureAction {
        None = 0,
        Acquire = 1,
    }
}
