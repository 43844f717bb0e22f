use crate::error::FlowError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Action identifiers of the hardware-device ("lockbox") pairing flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LockboxAction {
    DetermineLockboxRoute,
    // connections
    PollForDeviceApp,
    ResetConnectionStatus,
    SetCurrentApp,
    SetConnectionError,
    SetCurrentDevice,
    SetCurrentTransport,
    // new device setup
    InitializeNewDeviceSetup,
    SetConnectStep,
    SetNewDeviceInfo,
    SaveNewDeviceKvStore,
    SaveNewDeviceKvStoreLoading,
    SaveNewDeviceKvStoreSuccess,
    SaveNewDeviceKvStoreFailure,
    // update
    UpdateDeviceName,
    UpdateDeviceNameLoading,
    UpdateDeviceNameSuccess,
    UpdateDeviceNameFailure,
    UpdateDeviceFirmware,
    // delete
    DeleteDevice,
    DeleteDeviceLoading,
    DeleteDeviceSuccess,
    DeleteDeviceFailure,
}

impl LockboxAction {
    pub const ALL: [LockboxAction; 23] = [
        LockboxAction::DetermineLockboxRoute,
        LockboxAction::PollForDeviceApp,
        LockboxAction::ResetConnectionStatus,
        LockboxAction::SetCurrentApp,
        LockboxAction::SetConnectionError,
        LockboxAction::SetCurrentDevice,
        LockboxAction::SetCurrentTransport,
        LockboxAction::InitializeNewDeviceSetup,
        LockboxAction::SetConnectStep,
        LockboxAction::SetNewDeviceInfo,
        LockboxAction::SaveNewDeviceKvStore,
        LockboxAction::SaveNewDeviceKvStoreLoading,
        LockboxAction::SaveNewDeviceKvStoreSuccess,
        LockboxAction::SaveNewDeviceKvStoreFailure,
        LockboxAction::UpdateDeviceName,
        LockboxAction::UpdateDeviceNameLoading,
        LockboxAction::UpdateDeviceNameSuccess,
        LockboxAction::UpdateDeviceNameFailure,
        LockboxAction::UpdateDeviceFirmware,
        LockboxAction::DeleteDevice,
        LockboxAction::DeleteDeviceLoading,
        LockboxAction::DeleteDeviceSuccess,
        LockboxAction::DeleteDeviceFailure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LockboxAction::DetermineLockboxRoute => "@LOCKBOX.DETERMINE_LOCKBOX_ROUTE",
            LockboxAction::PollForDeviceApp => "@LOCKBOX.POLL_FOR_DEVICE_APP",
            LockboxAction::ResetConnectionStatus => "@LOCKBOX.RESET_CONNECTION_STATUS",
            LockboxAction::SetCurrentApp => "@LOCKBOX.SET_CURRENT_APP",
            LockboxAction::SetConnectionError => "@LOCKBOX.SET_CONNECTION_ERROR",
            LockboxAction::SetCurrentDevice => "@LOCKBOX.SET_CURRENT_DEVICE",
            LockboxAction::SetCurrentTransport => "@LOCKBOX.SET_CURRENT_TRANSPORT",
            LockboxAction::InitializeNewDeviceSetup => "@LOCKBOX.INITIALIZE_NEW_DEVICE_SETUP",
            LockboxAction::SetConnectStep => "@LOCKBOX.SET_CONNECT_STEP",
            LockboxAction::SetNewDeviceInfo => "@LOCKBOX.SET_NEW_DEVICE_INFO",
            LockboxAction::SaveNewDeviceKvStore => "@LOCKBOX.SAVE_NEW_DEVICE_KVSTORE",
            LockboxAction::SaveNewDeviceKvStoreLoading => {
                "@LOCKBOX.SAVE_NEW_DEVICE_KVSTORE_LOADING"
            }
            LockboxAction::SaveNewDeviceKvStoreSuccess => {
                "@LOCKBOX.SAVE_NEW_DEVICE_KVSTORE_SUCCESS"
            }
            LockboxAction::SaveNewDeviceKvStoreFailure => {
                "@LOCKBOX.SAVE_NEW_DEVICE_KVSTORE_FAILURE"
            }
            LockboxAction::UpdateDeviceName => "@LOCKBOX.UPDATE_DEVICE_NAME",
            LockboxAction::UpdateDeviceNameLoading => "@LOCKBOX.UPDATE_DEVICE_NAME_LOADING",
            LockboxAction::UpdateDeviceNameSuccess => "@LOCKBOX.UPDATE_DEVICE_NAME_SUCCESS",
            LockboxAction::UpdateDeviceNameFailure => "@LOCKBOX.UPDATE_DEVICE_NAME_FAILURE",
            LockboxAction::UpdateDeviceFirmware => "@LOCKBOX.UPDATE_DEVICE_FIRMWARE",
            LockboxAction::DeleteDevice => "@LOCKBOX.DELETE_DEVICE",
            LockboxAction::DeleteDeviceLoading => "@LOCKBOX.DELETE_DEVICE_LOADING",
            LockboxAction::DeleteDeviceSuccess => "@LOCKBOX.DELETE_DEVICE_SUCCESS",
            LockboxAction::DeleteDeviceFailure => "@LOCKBOX.DELETE_DEVICE_FAILURE",
        }
    }

    /// Loading/success/failure actions report the progress of an async request.
    pub fn is_async_status(&self) -> bool {
        let id = self.as_str();
        id.ends_with("_LOADING") || id.ends_with("_SUCCESS") || id.ends_with("_FAILURE")
    }
}

impl fmt::Display for LockboxAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LockboxAction {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LockboxAction::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| FlowError::Validation(format!("unknown lockbox action: {s}")))
    }
}
