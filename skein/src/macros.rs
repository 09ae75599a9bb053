/// Creates a single thread message from a role shorthand.
///
/// ```rust
/// use serde_json::json;
/// use skein::sk_msg;
///
/// let message = sk_msg!(assistant => "Done.");
/// assert_eq!(message, json!({"role": "assistant", "content": "Done."}));
/// ```
#[macro_export]
macro_rules! sk_msg {
    (system => $content:expr $(,)?) => {
        $crate::system_message($content)
    };
    (user => $content:expr $(,)?) => {
        $crate::user_message($content)
    };
    (assistant => $content:expr $(,)?) => {
        $crate::assistant_message($content)
    };
    ($role:ident => $content:expr $(,)?) => {
        compile_error!("unsupported role: use system, user, or assistant");
    };
}

/// Creates a thread (`Vec<serde_json::Value>`) from role/content pairs.
///
/// ```rust
/// use skein::sk_messages;
///
/// let thread = sk_messages![
///     system => "You are concise.",
///     user => "Summarize this repository.",
/// ];
///
/// assert_eq!(thread.len(), 2);
/// ```
#[macro_export]
macro_rules! sk_messages {
    () => {
        Vec::<::serde_json::Value>::new()
    };
    ($($role:ident => $content:expr),+ $(,)?) => {
        vec![$($crate::sk_msg!($role => $content)),+]
    };
}
