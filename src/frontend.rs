use crate::settings::PluginOptions;

const COPY_PASTE_GUARD: &str = r#"jQuery(document).ready(function($) {
    $(document).on('paste cut copy', '.wpcf7-form input, .wpcf7-form textarea, .wpcf7-form select', function(e) {
        e.preventDefault();
        return false;
    });
    $(document).on('contextmenu', '.wpcf7-form input, .wpcf7-form textarea, .wpcf7-form select', function(e) {
        e.preventDefault();
        return false;
    });
});"#;

/// Inline script to attach to public pages, if any.
pub fn inline_script(options: &PluginOptions) -> Option<&'static str> {
    options.disable_copy_paste.then_some(COPY_PASTE_GUARD)
}
