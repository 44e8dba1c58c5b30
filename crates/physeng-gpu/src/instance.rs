//! Vulkan instance creation.

use std::ffi::{c_void, CStr, CString};

use ash::vk;
use physeng_core::{ApplicationInfo, SemanticVersion, ENGINE_NAME, ENGINE_VERSION};

use crate::candidate::DeviceCandidate;
use crate::error::{GpuError, Result};
use crate::version::{from_vulkan_version, to_vulkan_version, MINIMUM_VULKAN_VERSION};

/// Validation layer enabled when validation is requested.
pub const VALIDATION_LAYER: &CStr = c"VK_LAYER_KHRONOS_validation";

/// The Vulkan instance, plus the debug messenger when validation is on.
pub struct Instance {
    // Entry must be kept alive for the lifetime of the instance
    #[allow(dead_code)]
    entry: ash::Entry,
    instance: ash::Instance,
    debug_utils: Option<(ash::ext::debug_utils::Instance, vk::DebugUtilsMessengerEXT)>,
    version: SemanticVersion,
}

impl Instance {
    /// Load Vulkan and create an instance for `app_info`.
    ///
    /// With `validation`, the Khronos validation layer and the debug utils
    /// extension are enabled when the loader provides them, and validation
    /// messages are forwarded to `tracing`.
    pub fn new(app_info: &ApplicationInfo, validation: bool) -> Result<Self> {
        let entry =
            unsafe { ash::Entry::load() }.map_err(|e| GpuError::Loading(e.to_string()))?;

        let version = instance_version(&entry)?;
        tracing::info!("Using Vulkan version {}", version);

        let layers = if validation {
            available_layers(&entry, &[VALIDATION_LAYER])?
        } else {
            Vec::new()
        };

        let extensions = if validation {
            available_extensions(&entry, &[ash::ext::debug_utils::NAME])?
        } else {
            Vec::new()
        };

        let instance = unsafe { create_instance(&entry, app_info, version, &layers, &extensions) }?;
        tracing::debug!("Vulkan instance has been created");

        let debug_utils = if extensions.contains(&ash::ext::debug_utils::NAME) {
            create_debug_messenger(&entry, &instance)
        } else {
            None
        };

        Ok(Self {
            entry,
            instance,
            debug_utils,
            version,
        })
    }

    /// Get the Vulkan instance handle.
    pub fn raw(&self) -> &ash::Instance {
        &self.instance
    }

    /// Vulkan version the instance was created with.
    pub const fn version(&self) -> SemanticVersion {
        self.version
    }

    /// Whether validation messages are being forwarded.
    pub const fn has_debug_messenger(&self) -> bool {
        self.debug_utils.is_some()
    }

    /// Snapshot every physical device the driver exposes.
    pub fn enumerate_candidates(&self) -> Result<Vec<DeviceCandidate>> {
        let devices = unsafe { self.instance.enumerate_physical_devices() }?;

        let candidates: Vec<DeviceCandidate> = devices
            .into_iter()
            .map(|device| unsafe { DeviceCandidate::query(&self.instance, device) })
            .collect();

        tracing::debug!("Found {} physical devices", candidates.len());

        Ok(candidates)
    }
}

impl Drop for Instance {
    fn drop(&mut self) {
        unsafe {
            if let Some((loader, messenger)) = self.debug_utils.take() {
                loader.destroy_debug_utils_messenger(messenger, None);
            }

            self.instance.destroy_instance(None);
        }
    }
}

/// Query the loader's instance version and check it against the minimum.
fn instance_version(entry: &ash::Entry) -> Result<SemanticVersion> {
    // `None` means a Vulkan 1.0 loader.
    let raw = unsafe { entry.try_enumerate_instance_version() }?.unwrap_or(vk::API_VERSION_1_0);
    let version = from_vulkan_version(raw);

    if version < MINIMUM_VULKAN_VERSION {
        return Err(GpuError::VersionTooLow {
            found: version,
            required: MINIMUM_VULKAN_VERSION,
        });
    }

    Ok(version)
}

/// The subset of `wanted` layers the loader knows about.
fn available_layers(entry: &ash::Entry, wanted: &[&'static CStr]) -> Result<Vec<&'static CStr>> {
    let properties = unsafe { entry.enumerate_instance_layer_properties() }?;

    Ok(wanted
        .iter()
        .copied()
        .filter(|&layer| {
            let found = properties.iter().any(|props| {
                let name = unsafe { CStr::from_ptr(props.layer_name.as_ptr()) };
                name == layer
            });
            if !found {
                tracing::warn!("Validation layer {:?} not available", layer);
            }
            found
        })
        .collect())
}

/// The subset of `wanted` instance extensions the loader knows about.
fn available_extensions(
    entry: &ash::Entry,
    wanted: &[&'static CStr],
) -> Result<Vec<&'static CStr>> {
    let properties = unsafe { entry.enumerate_instance_extension_properties(None) }?;

    Ok(wanted
        .iter()
        .copied()
        .filter(|&extension| {
            let found = properties.iter().any(|props| {
                let name = unsafe { CStr::from_ptr(props.extension_name.as_ptr()) };
                name == extension
            });
            if !found {
                tracing::warn!("Instance extension {:?} not available", extension);
            }
            found
        })
        .collect())
}

/// Create the raw Vulkan instance.
///
/// # Safety
/// The entry must be a valid Vulkan entry point.
unsafe fn create_instance(
    entry: &ash::Entry,
    app_info: &ApplicationInfo,
    version: SemanticVersion,
    layers: &[&CStr],
    extensions: &[&CStr],
) -> Result<ash::Instance> {
    let app_name = CString::new(app_info.name())
        .map_err(|e| GpuError::InvalidState(format!("application name: {e}")))?;
    let engine_name = CString::new(ENGINE_NAME)
        .map_err(|e| GpuError::InvalidState(format!("engine name: {e}")))?;

    let vk_app_info = vk::ApplicationInfo::default()
        .application_name(&app_name)
        .application_version(to_vulkan_version(app_info.version()))
        .engine_name(&engine_name)
        .engine_version(to_vulkan_version(ENGINE_VERSION))
        .api_version(to_vulkan_version(version));

    let layer_names: Vec<*const std::ffi::c_char> = layers.iter().map(|l| l.as_ptr()).collect();
    let extension_names: Vec<*const std::ffi::c_char> =
        extensions.iter().map(|e| e.as_ptr()).collect();

    let create_info = vk::InstanceCreateInfo::default()
        .application_info(&vk_app_info)
        .enabled_layer_names(&layer_names)
        .enabled_extension_names(&extension_names);

    let instance = unsafe { entry.create_instance(&create_info, None) }?;

    Ok(instance)
}

/// Create a messenger forwarding validation output to `tracing`.
///
/// Failing to create it only costs us the messages, so it is a warning.
fn create_debug_messenger(
    entry: &ash::Entry,
    instance: &ash::Instance,
) -> Option<(ash::ext::debug_utils::Instance, vk::DebugUtilsMessengerEXT)> {
    let loader = ash::ext::debug_utils::Instance::new(entry, instance);

    let create_info = vk::DebugUtilsMessengerCreateInfoEXT::default()
        .message_severity(
            vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
        )
        .message_type(
            vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        )
        .pfn_user_callback(Some(debug_callback));

    match unsafe { loader.create_debug_utils_messenger(&create_info, None) } {
        Ok(messenger) => {
            tracing::debug!("Vulkan debug utilities have been created");
            Some((loader, messenger))
        }
        Err(e) => {
            tracing::warn!(
                "Failed to create the debug utils ({e}). There will be no Vulkan API debug \
                 reporting from now on"
            );
            None
        }
    }
}

/// Label for a debug message type.
fn message_type_label(message_type: vk::DebugUtilsMessageTypeFlagsEXT) -> Option<&'static str> {
    match message_type {
        vk::DebugUtilsMessageTypeFlagsEXT::GENERAL => Some("GENERAL"),
        vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION => Some("VALIDATION"),
        vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE => Some("PERFORMANCE"),
        _ => None,
    }
}

unsafe extern "system" fn debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT<'_>,
    _p_user_data: *mut c_void,
) -> vk::Bool32 {
    let is_error = message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR);
    let is_warning = message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING);
    if !(is_error || is_warning) || p_callback_data.is_null() {
        return vk::FALSE;
    }

    let p_message = unsafe { (*p_callback_data).p_message };
    if p_message.is_null() {
        return vk::FALSE;
    }
    let message = unsafe { CStr::from_ptr(p_message) }.to_string_lossy();

    match (message_type_label(message_type), is_error) {
        (Some(label), true) => tracing::error!("{} - {}", label, message),
        (Some(label), false) => tracing::warn!("{} - {}", label, message),
        (None, true) => tracing::error!("{}", message),
        (None, false) => tracing::warn!("{}", message),
    }

    vk::FALSE
}
