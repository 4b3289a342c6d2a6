/// Generates `get_<entity>` and `update_<entity>` on a client wrapping a
/// [`ResourceClient`](crate::actor_framework::ResourceClient).
macro_rules! impl_client_methods {
    ($client_name:ident, $entity:ty, $error:ty, $entity_name_snake:ident) => {
        paste::paste! {
            impl $client_name {
                #[tracing::instrument(skip(self))]
                pub async fn [<get_ $entity_name_snake>](
                    &self,
                    id: <$entity as crate::actor_framework::Entity>::Id,
                ) -> Result<Option<$entity>, $error> {
                    tracing::debug!("Sending request");
                    self.inner.get(id).await.map_err(<$error>::from)
                }

                #[tracing::instrument(skip(self))]
                pub async fn [<update_ $entity_name_snake>](
                    &self,
                    id: <$entity as crate::actor_framework::Entity>::Id,
                    patch: <$entity as crate::actor_framework::Entity>::Patch,
                ) -> Result<$entity, $error> {
                    tracing::debug!("Sending request");
                    self.inner.update(id, patch).await.map_err(<$error>::from)
                }
            }
        }
    };
}

macro_rules! impl_client_new {
    ($client_name:ident, $entity:ty) => {
        impl $client_name {
            pub fn new(inner: crate::actor_framework::ResourceClient<$entity>) -> Self {
                Self { inner }
            }
        }
    };
}

macro_rules! impl_basic_client {
    ($client_name:ident, $entity:ty, $error:ty, $entity_name_snake:ident) => {
        impl_client_new!($client_name, $entity);
        impl_client_methods!($client_name, $entity, $error, $entity_name_snake);
    };
}

/// Generates a client method that sends one request variant and awaits its
/// oneshot reply. A closed or dropped actor maps to `$error::$closed(String)`.
macro_rules! client_method {
    ($client:ty => fn $method:ident($($param:ident: $param_type:ty),*) -> $return_type:ty as $request:ident::$variant:ident, Error = $error:ident::$closed:ident) => {
        impl $client {
            #[tracing::instrument(skip(self))]
            pub async fn $method(&self, $($param: $param_type),*) -> Result<$return_type, $error> {
                tracing::debug!("Sending request");
                let (respond_to, response) = tokio::sync::oneshot::channel();
                self.sender
                    .send($request::$variant {
                        $($param,)*
                        respond_to,
                    })
                    .await
                    .map_err(|_| $error::$closed("actor closed".to_string()))?;

                response
                    .await
                    .map_err(|_| $error::$closed("actor dropped the response".to_string()))?
            }
        }
    };
}
