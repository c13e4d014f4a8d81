use arch_navigator::ClipboardError;

/// What the page offers for writing to the system clipboard. Browsers only
/// expose the async clipboard API to secure contexts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
pub(crate) struct ClipboardSupport {
    pub has_window: bool,
    pub secure_context: bool,
    pub has_clipboard_api: bool,
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
impl ClipboardSupport {
    #[cfg(target_arch = "wasm32")]
    pub fn detect() -> Self {
        let Some(window) = web_sys::window() else {
            return Self {
                has_window: false,
                secure_context: false,
                has_clipboard_api: false,
            };
        };
        let clipboard = window.navigator().clipboard();
        let api: &wasm_bindgen::JsValue = clipboard.as_ref();
        Self {
            has_window: true,
            secure_context: window.is_secure_context(),
            has_clipboard_api: !api.is_undefined() && !api.is_null(),
        }
    }

    pub fn check(&self) -> Result<(), ClipboardError> {
        if self.has_window && self.secure_context && self.has_clipboard_api {
            Ok(())
        } else {
            Err(ClipboardError::Unavailable)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_needs_every_capability() {
        let full = ClipboardSupport {
            has_window: true,
            secure_context: true,
            has_clipboard_api: true,
        };
        assert!(full.check().is_ok());

        let insecure = ClipboardSupport {
            secure_context: false,
            ..full
        };
        assert!(matches!(insecure.check(), Err(ClipboardError::Unavailable)));

        let no_api = ClipboardSupport {
            has_clipboard_api: false,
            ..full
        };
        assert!(matches!(no_api.check(), Err(ClipboardError::Unavailable)));

        let headless = ClipboardSupport {
            has_window: false,
            ..full
        };
        assert!(matches!(headless.check(), Err(ClipboardError::Unavailable)));
    }
}
