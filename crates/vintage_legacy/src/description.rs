//! Static description trees.
//!
//! A [`Description`] is what a legacy runner reports about itself before running anything: a label,
//! an identity, and an ordered list of child descriptions. Suites of suites and enclosed classes are
//! simply deeper trees.

/// Node of a legacy description tree.
///
/// Two descriptions are the same legacy entity when their [`unique_id`](Description::unique_id)s
/// match; the display name is only a label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Description {
    unique_id: String,
    display_name: String,
    class_name: Option<String>,
    method_name: Option<String>,
    suite: bool,
    children: Vec<Description>,
}

impl Description {
    /// A suite identified only by its label, e.g. `TestSuite with 2 tests`.
    pub fn suite(display_name: impl Into<String>) -> Self {
        let display_name = display_name.into();
        Self {
            unique_id: display_name.clone(),
            display_name,
            class_name: None,
            method_name: None,
            suite: true,
            children: Vec::new(),
        }
    }

    /// A test class (or a suite class), labelled with its fully qualified name.
    pub fn class(class_name: impl Into<String>) -> Self {
        let class_name = class_name.into();
        Self {
            unique_id: class_name.clone(),
            display_name: class_name.clone(),
            class_name: Some(class_name),
            method_name: None,
            suite: true,
            children: Vec::new(),
        }
    }

    /// A single test method, labelled `method(class)`.
    pub fn test(class_name: impl Into<String>, method_name: impl Into<String>) -> Self {
        let class_name = class_name.into();
        let method_name = method_name.into();
        let display_name = format!("{method_name}({class_name})");
        Self {
            unique_id: display_name.clone(),
            display_name,
            class_name: Some(class_name),
            method_name: Some(method_name),
            suite: false,
            children: Vec::new(),
        }
    }

    /// Override the identity (legacy runners may use something other than the label).
    pub fn with_unique_id(mut self, unique_id: impl Into<String>) -> Self {
        self.unique_id = unique_id.into();
        self
    }

    pub fn with_child(mut self, child: Description) -> Self {
        self.children.push(child);
        self
    }

    pub fn add_child(&mut self, child: Description) {
        self.children.push(child);
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    pub fn method_name(&self) -> Option<&str> {
        self.method_name.as_deref()
    }

    pub fn children(&self) -> &[Description] {
        &self.children
    }

    /// A runnable leaf: not declared as a suite and without children.
    pub fn is_test(&self) -> bool {
        !self.suite && self.children.is_empty()
    }

    /// Anything that is not a test, including suites that turned out empty.
    pub fn is_suite(&self) -> bool {
        !self.is_test()
    }

    /// Number of runnable leaves below (or at) this description.
    pub fn test_count(&self) -> usize {
        if self.is_test() {
            1
        } else {
            self.children.iter().map(Description::test_count).sum()
        }
    }
}
