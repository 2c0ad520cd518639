use std::fmt::Debug;

pub type EmptyResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;
pub type ResultWithError<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

pub trait ResultTrait<T, E> {
    fn auto_err(self, desc: &str) -> ResultWithError<T>;
}

impl<T, E> ResultTrait<T, E> for Result<T, E>
where
    E: Debug,
{
    fn auto_err(self, desc: &str) -> ResultWithError<T> {
        self.map_err(|e| format!("{desc}: {e:?}").into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_context_is_prefixed() {
        let res: Result<(), &str> = Err("boom");
        let err = res.auto_err("Could not read record").unwrap_err();
        assert_eq!(err.to_string(), "Could not read record: \"boom\"");
    }
}
