mod modules;

use once_cell::sync::Lazy;

use self::modules::TestLock;

pub(crate) static LOCK: Lazy<TestLock> = Lazy::new(TestLock::new);
