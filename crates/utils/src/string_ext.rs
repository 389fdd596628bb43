/// Extends string types with useful functions
pub trait StringExt {
    /// Capilalises the first letter in a string
    ///
    /// ```rust
    /// # use r2s_utils::StringExt;
    /// assert_eq!("fe".capitalise(), "Fe".to_string());
    /// ```
    fn capitalise(&self) -> String;

    /// Lowercase everything but the first letter, which is capitalised
    ///
    /// Element symbols come in all sorts of cases from different codes, and
    /// this gives the conventional form.
    ///
    /// ```rust
    /// # use r2s_utils::StringExt;
    /// assert_eq!("CO".as_symbol(), "Co".to_string());
    /// assert_eq!("he".as_symbol(), "He".to_string());
    /// ```
    fn as_symbol(&self) -> String;
}

impl<T: AsRef<str>> StringExt for T {
    fn capitalise(&self) -> String {
        let mut c = self.as_ref().chars();
        match c.next() {
            Some(f) => f.to_uppercase().collect::<String>() + c.as_str(),
            None => String::new(),
        }
    }

    fn as_symbol(&self) -> String {
        self.as_ref().to_lowercase().capitalise()
    }
}
