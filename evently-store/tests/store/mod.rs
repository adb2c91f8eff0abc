use evently_query::{compile, parse};
use evently_store::{NewCampaign, NewEvent, PropertyBag, Store, StoreError};

fn unique(name: &str) -> String {
    format!("{name}-{}", uuid::Uuid::new_v4().simple())
}

pub async fn test_users(store: &Store) -> anyhow::Result<()> {
    let external_id = unique("user");
    let user = store.create_user(&external_id).await?;
    let other = store.create_user(unique("user")).await?;

    assert!(other.id > user.id);
    assert_eq!(
        store.find_user_by_external_id(&external_id).await?,
        Some(user.clone())
    );
    assert_eq!(store.find_user_by_external_id(unique("nobody")).await?, None);

    let users = store.find_users_by_ids(&[other.id, user.id, -1]).await?;
    assert_eq!(users, vec![user.clone(), other]);
    assert!(store.find_users_by_ids(&[]).await?.is_empty());

    assert!(matches!(
        store.create_user(&external_id).await,
        Err(StoreError::UserExists(_))
    ));

    Ok(())
}

pub async fn test_events(store: &Store) -> anyhow::Result<()> {
    let user = store.create_user(unique("user")).await?;
    let name = unique("purchase");
    let properties = PropertyBag::new()
        .with("product", "laptop")
        .with("amount", "1200")
        .with("currency", "EUR");

    let first = store
        .create_event(NewEvent::new(&name, user.id).properties(properties.clone()))
        .await?;
    let second = store
        .create_event(NewEvent::new(&name, user.id))
        .await?;
    let other = store
        .create_event(NewEvent::new(unique("refund"), user.id))
        .await?;

    assert!(first.id > 0);
    assert!(second.id > first.id);
    assert_eq!(first.properties, properties);
    assert_eq!(
        first.properties.keys().collect::<Vec<_>>(),
        vec!["product", "amount", "currency"]
    );

    let by_name = store.find_events_by_name(&name).await?;
    assert_eq!(
        by_name.iter().map(|e| e.id).collect::<Vec<_>>(),
        vec![first.id, second.id]
    );
    assert_eq!(by_name[0].properties, properties);
    assert_eq!(by_name[0].user_id, user.id);

    let by_ids = store.find_events_by_ids(&[other.id, first.id]).await?;
    assert_eq!(
        by_ids.iter().map(|e| e.id).collect::<Vec<_>>(),
        vec![first.id, other.id]
    );
    assert!(store.find_events_by_ids(&[]).await?.is_empty());

    assert!(matches!(
        store.create_event(NewEvent::new(&name, -1)).await,
        Err(StoreError::MissingReference(..))
    ));

    Ok(())
}

pub async fn test_search(store: &Store) -> anyhow::Result<()> {
    let user = store.create_user(unique("user")).await?;
    let name = unique("purchase");

    let laptop = store
        .create_event(
            NewEvent::new(&name, user.id).properties(
                PropertyBag::new()
                    .with("product", "laptop")
                    .with("amount", "1200.50")
                    .with("note", "gift for mom"),
            ),
        )
        .await?;
    let phone = store
        .create_event(
            NewEvent::new(&name, user.id).properties(
                PropertyBag::new()
                    .with("product", "phone")
                    .with("amount", "99")
                    .with("note", "50% off"),
            ),
        )
        .await?;
    let odd = store
        .create_event(
            NewEvent::new(&name, user.id).properties(
                PropertyBag::new()
                    .with("product", "laptop")
                    .with("amount", "n/a"),
            ),
        )
        .await?;
    store
        .create_event(
            NewEvent::new(unique("refund"), user.id)
                .properties(PropertyBag::new().with("product", "laptop")),
        )
        .await?;

    let search = |filter: &str| {
        let predicate = compile(name.as_str(), &parse(filter).unwrap()).unwrap();
        let store = store.clone();

        async move {
            store
                .search_events(&predicate)
                .await
                .map(|events| events.into_iter().map(|e| e.id).collect::<Vec<_>>())
        }
    };

    assert_eq!(search("product&laptop&=&end").await?, vec![laptop.id, odd.id]);
    assert_eq!(search("product&laptop&!=&end").await?, vec![phone.id]);
    assert_eq!(search("amount&100&>&end").await?, vec![laptop.id]);
    assert_eq!(search("amount&99&>=&end").await?, vec![laptop.id, phone.id]);
    assert_eq!(search("amount&1200.5&<&end").await?, vec![phone.id]);
    assert_eq!(search("amount&99&<=&end").await?, vec![phone.id]);
    assert_eq!(search("note&for&like&end").await?, vec![laptop.id]);
    assert_eq!(search("note&%&like&end").await?, vec![phone.id]);
    assert_eq!(
        search("product&laptop&=&and&note&gift for mom&=&end").await?,
        vec![laptop.id]
    );
    assert!(search("color&red&=&end").await?.is_empty());
    assert!(search("product&tablet&=&end").await?.is_empty());

    Ok(())
}

pub async fn test_numeric_range(store: &Store) -> anyhow::Result<()> {
    let user = store.create_user(unique("user")).await?;
    let name = unique("transfer");

    let mut ids = Vec::new();
    for amount in [
        "999999999999999999",
        "1000000000000000000",
        "100000000000000000000000000000",
        "0.0000000001",
        "0.00000000001",
    ] {
        let event = store
            .create_event(
                NewEvent::new(&name, user.id)
                    .properties(PropertyBag::new().with("amount", amount)),
            )
            .await?;
        ids.push(event.id);
    }

    let search = |filter: &str| {
        let predicate = compile(name.as_str(), &parse(filter).unwrap()).unwrap();
        let store = store.clone();

        async move {
            store
                .search_events(&predicate)
                .await
                .map(|events| events.into_iter().map(|e| e.id).collect::<Vec<_>>())
        }
    };

    assert_eq!(search("amount&0&>&end").await?, vec![ids[0], ids[3]]);
    assert!(search("amount&0&<=&end").await?.is_empty());
    assert_eq!(
        search("amount&999999999999999998&>&end").await?,
        vec![ids[0]]
    );

    Ok(())
}

pub async fn test_duplicate_keys(store: &Store) -> anyhow::Result<()> {
    let user = store.create_user(unique("user")).await?;
    let name = unique("purchase");
    let properties = PropertyBag::new()
        .with("product", "laptop")
        .with("product", "phone");

    assert!(matches!(
        store
            .create_event(NewEvent::new(&name, user.id).properties(properties.clone()))
            .await,
        Err(StoreError::DuplicatePropertyKey(key)) if key == "product"
    ));
    assert!(store.find_events_by_name(&name).await?.is_empty());

    let campaign = unique("summer-sale");
    assert!(matches!(
        store
            .create_campaign(NewCampaign::new(&campaign).properties(properties))
            .await,
        Err(StoreError::DuplicatePropertyKey(key)) if key == "product"
    ));
    assert!(!store.campaign_exists_by_name(&campaign).await?);

    Ok(())
}

pub async fn test_campaigns(store: &Store) -> anyhow::Result<()> {
    let name = unique("summer-sale");
    let properties = PropertyBag::new().with("product", "").with("amount", "");

    assert!(!store.campaign_exists_by_name(&name).await?);
    assert_eq!(store.find_campaign_by_name(&name).await?, None);

    let campaign = store
        .create_campaign(NewCampaign::new(&name).properties(properties.clone()))
        .await?;

    assert!(campaign.id > 0);
    assert_eq!(campaign.properties, properties);
    assert!(store.campaign_exists_by_name(&name).await?);
    assert_eq!(
        store.find_campaign_by_name(&name).await?,
        Some(campaign.clone())
    );

    assert!(matches!(
        store.create_campaign(NewCampaign::new(&name)).await,
        Err(StoreError::CampaignExists(existing)) if existing == name
    ));

    Ok(())
}

pub async fn test_campaign_events(store: &Store) -> anyhow::Result<()> {
    let user = store.create_user(unique("user")).await?;
    let campaign = store
        .create_campaign(
            NewCampaign::new(unique("summer-sale"))
                .properties(PropertyBag::new().with("product", "")),
        )
        .await?;
    let event = store
        .create_event(
            NewEvent::new(unique("purchase"), user.id)
                .properties(PropertyBag::new().with("product", "laptop")),
        )
        .await?;

    assert!(store.find_campaign_events(campaign.id).await?.is_empty());

    let link = store.create_campaign_event(campaign.id, event.id).await?;
    assert!(link.id > 0);
    assert_eq!(link.campaign_id, campaign.id);
    assert_eq!(link.event_id, event.id);

    assert_eq!(store.find_campaign_events(campaign.id).await?, vec![link]);

    assert!(store
        .create_campaign_event(campaign.id, -1)
        .await
        .is_err());

    Ok(())
}
